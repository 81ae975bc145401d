//! Test containers: the validated, host-side copy of a container's records.
//!
//! A [Container] borrows the engine it was loaded from, so the engine can't
//! be unloaded while any container is alive.  [Handle]s are plain values and
//! may outlive their container; each carries the generation of the container
//! that issued it, so using one with any other container fails.

use super::{
    abi::{self, IsIgnoredFn, LineFn, PhaseFn, RawTest, StringFn},
    bridge,
    err::{Error, Result},
};
use crate::{
    api::abs,
    logger::Sink,
    model::{Identity, Location, Phase},
};
use std::{
    ffi::c_void,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// A validated copy of one [RawTest] node.
#[derive(Copy, Clone)]
pub(super) struct Descriptor {
    self_: *mut c_void,
    set_up: PhaseFn,
    test: PhaseFn,
    tear_down: PhaseFn,
    is_ignored: IsIgnoredFn,
    name: StringFn,
    source: StringFn,
    line: LineFn,
}

impl Descriptor {
    /// Copies `raw`, naming the first null function pointer if any.
    fn of_raw(raw: &RawTest) -> std::result::Result<Self, &'static str> {
        Ok(Self {
            self_: raw.self_,
            set_up: raw.set_up.ok_or("setUp_")?,
            test: raw.test.ok_or("test_")?,
            tear_down: raw.tear_down.ok_or("tearDown_")?,
            is_ignored: raw.is_ignored.ok_or("isIgnored_")?,
            name: raw.name.ok_or("name_")?,
            source: raw.source.ok_or("source_")?,
            line: raw.line.ok_or("line_")?,
        })
    }

    fn phase_fn(&self, phase: Phase) -> PhaseFn {
        match phase {
            Phase::SetUp => self.set_up,
            Phase::Test => self.test,
            Phase::TearDown => self.tear_down,
        }
    }
}

/// Identifies one test inside one loaded container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    generation: u64,
    index: usize,
}

impl Handle {
    /// Gets the position of the test in its container's list.
    pub fn index(self) -> usize {
        self.index
    }
}

/// A loaded test container.
pub struct Container<'e> {
    path: PathBuf,
    generation: u64,
    descriptors: Vec<Descriptor>,
    _engine: PhantomData<&'e ()>,
}

impl<'e> Container<'e> {
    /// Walks the list starting at `head`, validating and copying each node.
    ///
    /// A null `head` gives an empty container.
    ///
    /// # Safety
    ///
    /// `head` must be null or the head of a list of [RawTest] nodes that stay
    /// valid, along with everything they point to, for `'e`.
    pub(crate) unsafe fn from_head(path: impl Into<PathBuf>, head: *const RawTest) -> Result<Self> {
        let path = path.into();
        let mut descriptors = vec![];
        let mut node = head;
        while let Some(raw) = node.as_ref() {
            if abi::MAX_ENTRIES <= descriptors.len() {
                return Err(Error::Unterminated(path));
            }
            let index = descriptors.len();
            let d = Descriptor::of_raw(raw).map_err(|field| Error::Malformed {
                path: path.clone(),
                index,
                field,
            })?;
            descriptors.push(d);
            node = raw.next;
        }
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(path = %path.display(), generation, tests = descriptors.len(), "loaded container");
        Ok(Self {
            path,
            generation,
            descriptors,
            _engine: PhantomData,
        })
    }

    /// Gets the path this container was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the number of tests in the container.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Gets whether the container has no tests.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Gets handles to every test, in list order.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        (0..self.descriptors.len()).map(move |index| Handle {
            generation: self.generation,
            index,
        })
    }

    /// Resolves `handle` to a test, checking it was issued by this container.
    pub fn get(&self, handle: Handle) -> Result<Test<'_>> {
        if handle.generation != self.generation {
            return Err(Error::StaleHandle);
        }
        self.descriptors
            .get(handle.index)
            .map(|d| Test { d })
            .ok_or(Error::StaleHandle)
    }

    /// Iterates over every test, in list order.
    pub fn tests(&self) -> impl Iterator<Item = Test<'_>> + '_ {
        self.descriptors.iter().map(|d| Test { d })
    }
}

/// A test inside a loaded [Container].
#[derive(Copy, Clone)]
pub struct Test<'c> {
    d: &'c Descriptor,
}

impl Test<'_> {
    /// Asks the container for the test's name.
    pub fn name(&self) -> String {
        unsafe { abi::string_or_empty((self.d.name)(self.d.self_)) }
    }

    /// Asks the container for the test's source file.
    pub fn source(&self) -> String {
        unsafe { abi::string_or_empty((self.d.source)(self.d.self_)) }
    }

    /// Asks the container for the test's line.
    pub fn line(&self) -> u32 {
        abi::line_of(unsafe { (self.d.line)(self.d.self_) })
    }
}

impl abs::Test for Test<'_> {
    fn identity(&self) -> Identity {
        Identity::new(self.name(), Location::new(self.source(), self.line()))
    }

    fn is_ignored(&self) -> bool {
        unsafe { (self.d.is_ignored)(self.d.self_) != 0 }
    }

    fn run_phase(&self, phase: Phase, sink: &mut Sink) {
        let f = self.d.phase_fn(phase);
        let mut logger = bridge::bridge(sink);
        unsafe { f(self.d.self_, &mut logger) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::abs::Test as _;
    use std::{os::raw::c_char, os::raw::c_int, ptr};

    unsafe extern "C-unwind" fn nop(_: *mut c_void, _: *mut abi::RawLogger) {}
    unsafe extern "C" fn not_ignored(_: *const c_void) -> c_int {
        0
    }
    unsafe extern "C" fn name(_: *const c_void) -> *const c_char {
        b"nopTest\0".as_ptr() as *const c_char
    }
    unsafe extern "C" fn source(_: *const c_void) -> *const c_char {
        b"nop.t.c\0".as_ptr() as *const c_char
    }
    unsafe extern "C" fn line(_: *const c_void) -> c_int {
        3
    }

    fn node(next: *mut RawTest) -> RawTest {
        RawTest {
            self_: ptr::null_mut(),
            set_up: Some(nop),
            test: Some(nop),
            tear_down: Some(nop),
            is_ignored: Some(not_ignored),
            name: Some(name),
            source: Some(source),
            line: Some(line),
            next,
        }
    }

    #[test]
    /// A null head gives an empty container.
    fn test_from_head_empty() {
        let c = unsafe { Container::from_head("empty.t.so", ptr::null()) }.unwrap();
        assert!(c.is_empty());
        assert_eq!(c.handles().count(), 0);
    }

    #[test]
    /// The container has one entry per node, in list order.
    fn test_from_head_list() {
        let mut second = node(ptr::null_mut());
        let first = node(&mut second);
        let c = unsafe { Container::from_head("nop.t.so", &first) }.unwrap();
        assert_eq!(c.len(), 2);
        let t = c.tests().next().unwrap();
        assert_eq!(
            t.identity(),
            Identity::new("nopTest", Location::new("nop.t.c", 3))
        );
        assert!(!t.is_ignored());
    }

    #[test]
    /// Nodes with null function pointers are rejected.
    fn test_from_head_malformed() {
        let mut second = node(ptr::null_mut());
        second.tear_down = None;
        let first = node(&mut second);
        match unsafe { Container::from_head("bad.t.so", &first) } {
            Err(Error::Malformed { index, field, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "tearDown_");
            }
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("malformed list accepted"),
        }
    }

    #[test]
    /// A cyclic list is rejected rather than walked forever.
    fn test_from_head_cycle() {
        let mut n = node(ptr::null_mut());
        let p: *mut RawTest = &mut n;
        n.next = p;
        assert!(matches!(
            unsafe { Container::from_head("cycle.t.so", p) },
            Err(Error::Unterminated(_))
        ));
    }

    #[test]
    /// Handles from one container don't work on another.
    fn test_stale_handle() {
        let n = node(ptr::null_mut());
        let a = unsafe { Container::from_head("a.t.so", &n) }.unwrap();
        let b = unsafe { Container::from_head("b.t.so", &n) }.unwrap();
        let h = a.handles().next().unwrap();
        assert!(a.get(h).is_ok());
        assert!(matches!(b.get(h), Err(Error::StaleHandle)));
    }
}
