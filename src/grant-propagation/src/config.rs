// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Dynamically updatable configuration.
//!
//! A type-safe static [`Config`] is defined near where it is used and is
//! registered into a [`ConfigSet`]. Values within a set are shared, so a set
//! can be cloned and handed to the planner while another thread updates it.
//! Separate sets are completely independent, which keeps unit tests from
//! interfering with each other.
//!
//! ```
//! # use grant_propagation::config::{Config, ConfigSet};
//! const FOO: Config<bool> = Config::new("foo", false, "description of foo");
//! let cfg = ConfigSet::default().add(&FOO);
//! assert_eq!(FOO.get(&cfg), false);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// A handle to a dynamically updatable configuration value of type `T`.
#[derive(Clone, Debug)]
pub struct Config<T: ConfigType> {
    name: &'static str,
    desc: &'static str,
    default: T,
}

impl<T: ConfigType> Config<T> {
    /// Constructs a handle for a config of type `T`.
    pub const fn new(name: &'static str, default: T, desc: &'static str) -> Self {
        Config {
            name,
            default,
            desc,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn desc(&self) -> &str {
        self.desc
    }

    pub fn default(&self) -> &T {
        &self.default
    }

    /// Returns the latest value of this config within the given set.
    ///
    /// Panics if this config was not previously registered to the set.
    pub fn get(&self, set: &ConfigSet) -> T {
        T::get(T::shared(self, set).expect("config should be registered to set"))
    }

    /// Updates the value of this config within the given set. The update is
    /// visible to every clone of the set.
    ///
    /// Panics if this config was not previously registered to the set.
    pub fn set(&self, set: &ConfigSet, val: T) {
        T::set(
            T::shared(self, set).expect("config should be registered to set"),
            val,
        )
    }
}

/// A type usable as a [`Config`].
pub trait ConfigType: Sized + Clone {
    /// A value of this type, sharable between config updaters and readers.
    type Shared;

    /// Extracts the sharable value for a config of this type from a set.
    fn shared<'a>(config: &Config<Self>, vals: &'a ConfigSet) -> Option<&'a Arc<Self::Shared>>;

    /// Converts this type to its type-erased enum equivalent.
    fn to_val(val: &Self) -> ConfigVal;

    fn get(x: &Self::Shared) -> Self;

    fn set(x: &Self::Shared, val: Self);
}

/// A set of [`Config`]s with values independent of other [`ConfigSet`]s
/// (even if they contain the same configs).
#[derive(Clone, Default)]
pub struct ConfigSet {
    configs: BTreeMap<String, ConfigEntry>,
}

impl ConfigSet {
    /// Adds the given config to this set.
    ///
    /// Panics if a config with the same name has previously been added.
    pub fn add<T: ConfigType>(mut self, config: &Config<T>) -> Self {
        let entry = ConfigEntry {
            name: config.name,
            desc: config.desc,
            default: T::to_val(&config.default),
            val: T::to_val(&config.default),
        };
        if let Some(prev) = self.configs.insert(config.name.to_owned(), entry) {
            panic!("{} registered twice", prev.name);
        }
        self
    }

    /// Returns the configs currently registered to this set.
    pub fn entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.configs.values()
    }
}

impl fmt::Debug for ConfigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ConfigSet { configs } = self;
        f.debug_map()
            .entries(configs.iter().map(|(name, entry)| (name, entry.val())))
            .finish()
    }
}

/// An entry for a config in a [`ConfigSet`].
#[derive(Clone, Debug)]
pub struct ConfigEntry {
    name: &'static str,
    desc: &'static str,
    default: ConfigVal,
    val: ConfigVal,
}

impl ConfigEntry {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn desc(&self) -> &'static str {
        self.desc
    }

    /// The default value of this config. This value is never updated.
    pub fn default(&self) -> &ConfigVal {
        &self.default
    }

    pub fn val(&self) -> &ConfigVal {
        &self.val
    }
}

/// A type-erased [`ConfigType::Shared`].
#[derive(Clone, Debug)]
pub enum ConfigVal {
    Bool(Arc<AtomicBool>),
}

mod impls {
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering::SeqCst;
    use std::sync::Arc;

    use crate::config::{Config, ConfigSet, ConfigType, ConfigVal};

    impl ConfigType for bool {
        type Shared = AtomicBool;

        fn shared<'a>(config: &Config<Self>, vals: &'a ConfigSet) -> Option<&'a Arc<Self::Shared>> {
            let entry = vals.configs.get(config.name)?;
            match entry.val() {
                ConfigVal::Bool(x) => Some(x),
            }
        }

        fn to_val(val: &Self) -> ConfigVal {
            ConfigVal::Bool(Arc::new((*val).into()))
        }

        fn get(x: &Self::Shared) -> Self {
            x.load(SeqCst)
        }

        fn set(x: &Self::Shared, val: Self) {
            x.store(val, SeqCst);
        }
    }
}
