use crate::{context::ContextState, types::err::ConfigError};

/// A configurable value, together with its bounds and the latest state of a context in which the value may be changed.
#[derive(Clone, Debug)]
pub struct ConfigOption<T> {
    pub name: &'static str,
    pub min: T,
    pub max: T,
    pub max_state: ContextState,
    pub value: T,
}

impl<T: Clone> ConfigOption<T> {
    pub fn min_max(&self) -> (T, T) {
        (self.min.clone(), self.max.clone())
    }
}

impl<T: Clone + PartialOrd> ConfigOption<T> {
    /// Ok if the value of the option is within its bounds.
    pub fn check(&self) -> Result<(), ConfigError> {
        match self.min <= self.value && self.value <= self.max {
            true => Ok(()),
            false => Err(ConfigError::OutOfRange(self.name)),
        }
    }

    /// Sets the value of the option, so long as the value is within bounds and the context has not passed the latest state at which the option may be changed.
    pub fn set(&mut self, value: T, state: &ContextState) -> Result<(), ConfigError> {
        if *state > self.max_state {
            return Err(ConfigError::Locked(self.name));
        }
        if value < self.min || self.max < value {
            return Err(ConfigError::OutOfRange(self.name));
        }
        self.value = value;
        Ok(())
    }
}
