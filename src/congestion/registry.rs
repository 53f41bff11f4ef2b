use rustc_hash::FxHashMap as HashMap;

use crate::{
    Error, Result,
    config::{CongestionConfig, CongestionControllerKind},
};

use super::{
    CongestionController, adaptive_reno::AdaptiveReno, new_reno::NewReno, westwood::WestwoodPlus,
};

pub type Constructor = fn(&CongestionConfig) -> Box<dyn CongestionController>;

fn adaptive_reno(config: &CongestionConfig) -> Box<dyn CongestionController> {
    Box::new(AdaptiveReno::from_config(config))
}

fn westwood_plus(config: &CongestionConfig) -> Box<dyn CongestionController> {
    Box::new(WestwoodPlus::from_config(config))
}

fn new_reno(config: &CongestionConfig) -> Box<dyn CongestionController> {
    Box::new(NewReno::from_config(config))
}

/// Maps congestion controller names, as they appear in configuration, to
/// constructors.
#[derive(Clone)]
pub struct Registry {
    constructors: HashMap<&'static str, Constructor>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.names().collect::<Vec<_>>();
        names.sort_unstable();
        f.debug_struct("Registry").field("names", &names).finish()
    }
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::default(),
        }
    }

    /// A registry with every controller shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut constructors = HashMap::default();
        for kind in CongestionControllerKind::ALL {
            let ctor: Constructor = match kind {
                CongestionControllerKind::AdaptiveReno => adaptive_reno,
                CongestionControllerKind::WestwoodPlus => westwood_plus,
                CongestionControllerKind::NewReno => new_reno,
            };
            constructors.insert(kind.name(), ctor);
        }
        Self { constructors }
    }

    pub fn register(&mut self, name: &'static str, ctor: Constructor) -> Result<()> {
        if self.constructors.contains_key(name) {
            return Err(Error::DuplicateController(name));
        }
        self.constructors.insert(name, ctor);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    /// Builds the controller registered under `name`. The `kind` in `config` is ignored.
    pub fn create(
        &self,
        name: &str,
        config: &CongestionConfig,
    ) -> Result<Box<dyn CongestionController>> {
        let ctor = self
            .constructors
            .get(name)
            .ok_or_else(|| Error::UnknownController(name.to_owned()))?;
        Ok(ctor(config))
    }
}
