//! Persistent evaluation environment.

use std::fmt;
use std::rc::Rc;

use super::Term;

/// Immutable name → term mapping with structural sharing.
///
/// Extending an environment allocates one frame and leaves the original
/// untouched, so a closure holding an `Env` keeps seeing exactly the bindings
/// that existed when it was created. Cloning is a reference-count bump.
#[derive(Clone, Default)]
pub struct Env(Option<Rc<Frame>>);

struct Frame {
    name: Rc<str>,
    value: Term,
    next: Env,
}

impl Env {
    pub fn new() -> Self {
        Env(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// A new environment with `name` bound to `value`, shadowing any outer
    /// binding of the same name.
    pub fn extend(&self, name: impl Into<Rc<str>>, value: Term) -> Env {
        Env(Some(Rc::new(Frame {
            name: name.into(),
            value,
            next: self.clone(),
        })))
    }

    pub fn lookup(&self, name: &str) -> Option<&Term> {
        let mut current = self.0.as_deref();
        while let Some(frame) = current {
            if &*frame.name == name {
                return Some(&frame.value);
            }
            current = frame.next.0.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Bound names, innermost first. Shadowed names appear once per binding.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let mut current = self.0.as_deref();
        std::iter::from_fn(move || {
            let frame = current?;
            current = frame.next.0.as_deref();
            Some(&*frame.name)
        })
    }
}

impl<N: Into<Rc<str>>> FromIterator<(N, Term)> for Env {
    fn from_iter<I: IntoIterator<Item = (N, Term)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Env::new(), |env, (name, value)| env.extend(name, value))
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
