//! Per-invocation dependency-injection scope.
//!
//! A [`Scope`] holds named [`Constructor`]s keyed by the type they produce.
//! Resolving a type runs its factory once and caches the result for the rest
//! of the scope; factories may resolve their own dependencies through the
//! scope they receive. [`run_action`] wraps a whole invocation: provide,
//! invoke, then tear down in reverse order on every exit path.
//!
//! ```
//! use std::rc::Rc;
//! use wiregen::container::{Constructor, Scope};
//!
//! struct Pool(String);
//!
//! let scope = Scope::new();
//! scope.provide(Constructor::new("url", |_| Ok(String::from("postgres://db"))))?;
//! scope.provide(Constructor::new("pool", |s: &Scope| {
//!     let url: Rc<String> = s.resolve()?;
//!     Ok(Pool(url.to_string()))
//! }))?;
//!
//! let pool: Rc<Pool> = scope.resolve()?;
//! assert_eq!(pool.0, "postgres://db");
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

mod action;
mod env;

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::error::ComponentError;

pub use action::run_action;
pub use env::env_constructor;

/// Errors raised while registering or resolving constructors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WiringError {
    /// A constructor for the same type and name is already registered.
    #[error("constructor '{name}' for {type_name} is already provided")]
    Duplicate {
        /// Produced type.
        type_name: &'static str,
        /// Constructor name.
        name: String,
    },

    /// Nothing produces the requested type.
    #[error("no constructor provides {type_name}")]
    Missing {
        /// Requested type.
        type_name: &'static str,
    },

    /// No constructor with the requested name produces the type.
    #[error("no constructor named '{name}' provides {type_name}")]
    MissingNamed {
        /// Requested type.
        type_name: &'static str,
        /// Requested constructor name.
        name: String,
    },

    /// Resolution re-entered a constructor that is still running.
    #[error("dependency cycle while constructing {type_name}")]
    Cycle {
        /// Type whose construction re-entered itself.
        type_name: &'static str,
    },

    /// Several constructors produce the requested type; use a name.
    #[error("{count} constructors provide {type_name}; resolve by name")]
    Ambiguous {
        /// Requested type.
        type_name: &'static str,
        /// Number of matching constructors.
        count: usize,
    },

    /// A factory returned an error.
    #[error("constructor '{name}' for {type_name} failed: {source}")]
    Construct {
        /// Produced type.
        type_name: &'static str,
        /// Constructor name.
        name: String,
        /// Error returned by the factory.
        #[source]
        source: ComponentError,
    },

    /// A cached value did not have the type its key promised.
    #[error("cached value for '{name}' is not a {type_name}")]
    TypeMismatch {
        /// Expected type.
        type_name: &'static str,
        /// Constructor name.
        name: String,
    },
}

type Factory = Box<dyn Fn(&Scope) -> Result<Rc<dyn Any>, ComponentError>>;

/// A named factory producing one value type.
pub struct Constructor {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    factory: Factory,
}

impl Constructor {
    /// Creates a constructor named `name` producing `T`.
    ///
    /// An empty name registers the type's unnamed constructor.
    pub fn new<T, F>(name: impl Into<String>, factory: F) -> Self
    where
        T: 'static,
        F: Fn(&Scope) -> Result<T, ComponentError> + 'static,
    {
        Self {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            factory: Box::new(move |scope| factory(scope).map(|value| Rc::new(value) as Rc<dyn Any>)),
        }
    }

    /// Constructor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the produced type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

type Key = (TypeId, String);

/// Constructor registry and instance cache for one invocation.
#[derive(Default)]
pub struct Scope {
    constructors: RefCell<IndexMap<Key, Rc<Constructor>>>,
    instances: RefCell<HashMap<Key, Rc<dyn Any>>>,
    resolving: RefCell<Vec<Key>>,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("constructors", &self.constructors.borrow().len())
            .field("instances", &self.instances.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor`.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::Duplicate`] when the same type and name are
    /// already registered.
    pub fn provide(&self, constructor: Constructor) -> Result<(), WiringError> {
        let key = (constructor.type_id, constructor.name.clone());
        let mut constructors = self.constructors.borrow_mut();
        if constructors.contains_key(&key) {
            return Err(WiringError::Duplicate {
                type_name: constructor.type_name,
                name: constructor.name,
            });
        }
        tracing::debug!(name = %constructor.name, type_name = constructor.type_name, "provided constructor");
        constructors.insert(key, Rc::new(constructor));
        Ok(())
    }

    /// Number of registered constructors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.borrow().len()
    }

    /// Whether no constructors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.borrow().is_empty()
    }

    /// Resolves the single constructor producing `T`.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::Missing`] or [`WiringError::Ambiguous`] when
    /// zero or several constructors produce `T`, and propagates failures from
    /// the factory and its dependencies.
    pub fn resolve<T: 'static>(&self) -> Result<Rc<T>, WiringError> {
        let type_id = TypeId::of::<T>();
        let names: Vec<String> = self
            .constructors
            .borrow()
            .keys()
            .filter(|(id, _)| *id == type_id)
            .map(|(_, name)| name.clone())
            .collect();
        match names.as_slice() {
            [name] => self.resolve_named::<T>(name),
            [] => Err(WiringError::Missing {
                type_name: type_name::<T>(),
            }),
            many => Err(WiringError::Ambiguous {
                type_name: type_name::<T>(),
                count: many.len(),
            }),
        }
    }

    /// Resolves the constructor named `name` producing `T`.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::MissingNamed`] when no such constructor
    /// exists, [`WiringError::Cycle`] when construction re-enters itself, and
    /// [`WiringError::Construct`] when the factory fails.
    pub fn resolve_named<T: 'static>(&self, name: &str) -> Result<Rc<T>, WiringError> {
        let key = (TypeId::of::<T>(), name.to_owned());
        if let Some(instance) = self.constructed::<T>(name) {
            return Ok(instance);
        }
        let constructor = self
            .constructors
            .borrow()
            .get(&key)
            .cloned()
            .ok_or_else(|| WiringError::MissingNamed {
                type_name: type_name::<T>(),
                name: name.to_owned(),
            })?;

        if self.resolving.borrow().contains(&key) {
            return Err(WiringError::Cycle {
                type_name: constructor.type_name,
            });
        }
        self.resolving.borrow_mut().push(key.clone());
        let built = (constructor.factory)(self);
        self.resolving.borrow_mut().retain(|pending| *pending != key);

        let value = built.map_err(|source| match source.downcast::<WiringError>() {
            Ok(inner) => *inner,
            Err(other) => WiringError::Construct {
                type_name: constructor.type_name,
                name: name.to_owned(),
                source: other,
            },
        })?;
        let typed = Rc::clone(&value)
            .downcast::<T>()
            .map_err(|_| WiringError::TypeMismatch {
                type_name: type_name::<T>(),
                name: name.to_owned(),
            })?;
        self.instances.borrow_mut().insert(key, value);
        Ok(typed)
    }

    /// Returns the cached `T` built by constructor `name`, without
    /// constructing it.
    #[must_use]
    pub fn constructed<T: 'static>(&self, name: &str) -> Option<Rc<T>> {
        let key = (TypeId::of::<T>(), name.to_owned());
        let instance = self.instances.borrow().get(&key).cloned()?;
        instance.downcast::<T>().ok()
    }

    /// Resolves `T` and passes it to `action`.
    ///
    /// # Errors
    ///
    /// Propagates resolution failures and errors returned by `action`.
    pub fn invoke<T, R, F>(&self, action: F) -> Result<R, ComponentError>
    where
        T: 'static,
        F: FnOnce(&T) -> Result<R, ComponentError>,
    {
        let dependency = self.resolve::<T>()?;
        action(&dependency)
    }
}
