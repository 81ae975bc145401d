//! Test cases and fixtures.

use super::thunk::{Hook, Thunk};
use crate::{
    api::abs,
    logger::Sink,
    model::{Identity, Location, Phase},
};
use std::{fmt, sync::Arc};

/// A reusable set-up/tear-down bundle that several test bodies can share.
///
/// Fixtures are shared between test cases, so any state they keep must use
/// interior mutability.
pub trait Fixture: Send + Sync {
    /// Prepares the fixture before a test body runs.
    fn set_up(&self) {}

    /// Releases whatever [Fixture::set_up] acquired.
    ///
    /// This runs whenever `set_up` succeeded, even if the body failed.
    fn tear_down(&self) {}
}

/// A fixture built from two plain functions.
#[derive(Copy, Clone)]
pub struct FnFixture {
    /// Called as the set-up hook.
    pub set_up: fn(),
    /// Called as the tear-down hook.
    pub tear_down: fn(),
}

impl Fixture for FnFixture {
    fn set_up(&self) {
        (self.set_up)()
    }

    fn tear_down(&self) {
        (self.tear_down)()
    }
}

/// The type of test bodies.
pub type BodyFn = Box<dyn Fn() + Send + Sync>;

/// A single registrable test: identity, ignored flag, optional fixture, and
/// body.
pub struct TestCase {
    identity: Identity,
    ignored: bool,
    fixture: Option<Arc<dyn Fixture>>,
    body: BodyFn,
}

impl TestCase {
    /// Constructs a test case named `name` declared at `source:line`.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        line: u32,
        body: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            identity: Identity::new(name, Location::new(source, line)),
            ignored: false,
            fixture: None,
            body: Box::new(body),
        }
    }

    /// Marks this test case as ignored (or not).
    #[must_use]
    pub fn ignore(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Attaches a fixture to this test case.
    #[must_use]
    pub fn with_fixture(mut self, fixture: Arc<dyn Fixture>) -> Self {
        self.fixture = Some(fixture);
        self
    }

    /// Gets this test case's identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Gets the test case's name.
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Gets where the test case was declared.
    pub fn location(&self) -> &Location {
        &self.identity.location
    }

    /// Gets whether this test case is ignored.
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Runs the fixture's set-up hook, if any.
    pub fn set_up(&self) {
        if let Some(f) = &self.fixture {
            f.set_up()
        }
    }

    /// Runs the body.
    pub fn test(&self) {
        (self.body)()
    }

    /// Runs the fixture's tear-down hook, if any.
    pub fn tear_down(&self) {
        if let Some(f) = &self.fixture {
            f.tear_down()
        }
    }

    /// Gets a thunk for the hook implementing `phase`.
    pub fn thunk(&self, phase: Phase) -> Thunk<'_> {
        match phase {
            Phase::SetUp => Thunk::create::<_, hook::SetUp>(self),
            Phase::Test => Thunk::create::<_, hook::Body>(self),
            Phase::TearDown => Thunk::create::<_, hook::TearDown>(self),
        }
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("identity", &self.identity)
            .field("ignored", &self.ignored)
            .field("has_fixture", &self.fixture.is_some())
            .finish()
    }
}

/// The hooks a [TestCase] exposes through thunks.
pub mod hook {
    use super::{Hook, TestCase};

    /// Hook selecting [TestCase::set_up].
    pub struct SetUp;
    /// Hook selecting [TestCase::test].
    pub struct Body;
    /// Hook selecting [TestCase::tear_down].
    pub struct TearDown;

    impl Hook<TestCase> for SetUp {
        fn call(target: &TestCase) {
            target.set_up()
        }
    }

    impl Hook<TestCase> for Body {
        fn call(target: &TestCase) {
            target.test()
        }
    }

    impl Hook<TestCase> for TearDown {
        fn call(target: &TestCase) {
            target.tear_down()
        }
    }
}

/// Test cases run in-process report through panics, so the sink goes unused.
impl abs::Test for TestCase {
    fn identity(&self) -> Identity {
        self.identity.clone()
    }

    fn is_ignored(&self) -> bool {
        self.ignored
    }

    fn run_phase(&self, phase: Phase, _sink: &mut Sink) {
        self.thunk(phase).invoke()
    }
}

/// Registers a test case with a registry, taking its location from the call
/// site.
///
/// ```
/// use yunit::api::rust::Registry;
/// let mut registry = Registry::new();
/// yunit::test_case!(registry, "emptyTest", || {});
/// assert_eq!(registry.len(), 1);
/// ```
#[macro_export]
macro_rules! test_case {
    ($registry:expr, $name:expr, $body:expr) => {
        $registry.add($crate::api::rust::TestCase::new(
            $name,
            file!(),
            line!(),
            $body,
        ))
    };
}
