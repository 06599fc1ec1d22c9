//! Single-slot user callback.
//!
//! Replaces the function-pointer + `void*` pair: the closure carries its
//! own state. Setting a new callback replaces the previous one.

/// One replaceable callback taking an argument of type `T`.
pub struct CallbackSlot<T> {
    callback: Option<Box<dyn FnMut(T)>>,
}

impl<T> CallbackSlot<T> {
    pub fn new() -> Self {
        Self { callback: None }
    }

    /// Store `f`, dropping any previous callback.
    pub fn set(&mut self, f: impl FnMut(T) + 'static) {
        self.callback = Some(Box::new(f));
    }

    pub fn clear(&mut self) {
        self.callback = None;
    }

    pub fn is_set(&self) -> bool {
        self.callback.is_some()
    }

    /// Invoke the callback if one is set. Returns whether it ran.
    pub fn fire(&mut self, arg: T) -> bool {
        match self.callback.as_mut() {
            Some(cb) => {
                cb(arg);
                true
            }
            None => false,
        }
    }
}

impl<T> Default for CallbackSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for CallbackSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("set", &self.is_set())
            .finish()
    }
}
