//! Type-erased calls to lifecycle hooks.
//!
//! A [Thunk] pairs a plain function pointer with an opaque context pointer.
//! Callers can invoke any hook on any object through the same call shape
//! without knowing its concrete type, and without a trait object or closure
//! standing in between.

use std::marker::PhantomData;

/// A zero-argument hook on objects of type `T`, selected at compile time.
pub trait Hook<T: ?Sized> {
    /// Calls the hook on `target`.
    fn call(target: &T);
}

/// An immutable `(function, context)` pair bound to a borrowed target.
///
/// Thunks can only be built through [Thunk::create], so there is no empty
/// thunk to invoke by mistake, and the borrow keeps the target alive for as
/// long as the thunk exists.
#[derive(Copy, Clone)]
pub struct Thunk<'a> {
    invoke: unsafe fn(*const ()),
    context: *const (),
    _target: PhantomData<&'a ()>,
}

impl<'a> Thunk<'a> {
    /// Binds the hook `H` to `instance`.
    pub fn create<T, H: Hook<T>>(instance: &'a T) -> Self {
        Self {
            invoke: trampoline::<T, H>,
            context: instance as *const T as *const (),
            _target: PhantomData,
        }
    }

    /// Calls the bound hook.
    pub fn invoke(&self) {
        // The context came from a `&'a T` matching the trampoline's `T`,
        // and the borrow is still live.
        unsafe { (self.invoke)(self.context) }
    }
}

unsafe fn trampoline<T, H: Hook<T>>(context: *const ()) {
    H::call(&*(context as *const T))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter {
        ups: Cell<u32>,
        downs: Cell<u32>,
    }

    struct Up;
    struct Down;

    impl Hook<Counter> for Up {
        fn call(target: &Counter) {
            target.ups.set(target.ups.get() + 1)
        }
    }

    impl Hook<Counter> for Down {
        fn call(target: &Counter) {
            target.downs.set(target.downs.get() + 1)
        }
    }

    #[test]
    /// Thunks call the hook they were created with, on their own target.
    fn test_thunks_dispatch() {
        let c = Counter {
            ups: Cell::new(0),
            downs: Cell::new(0),
        };
        let up = Thunk::create::<_, Up>(&c);
        let down = Thunk::create::<_, Down>(&c);
        up.invoke();
        up.invoke();
        down.invoke();
        assert_eq!(c.ups.get(), 2);
        assert_eq!(c.downs.get(), 1);
    }
}
