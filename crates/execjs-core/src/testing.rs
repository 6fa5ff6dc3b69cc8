//! In-memory runtime for unit tests.

use crate::error::{Error, Result};
use crate::runtime::{Context, Runtime};
use serde_json::Value;

/// Runtime whose contexts echo their input back.
pub struct Fixed {
    name: &'static str,
    available: bool,
    deprecated: bool,
}

impl Fixed {
    pub fn new(name: &'static str, available: bool) -> Self {
        Self {
            name,
            available,
            deprecated: false,
        }
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

impl Runtime for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    fn compile(&self, prelude: &str) -> Result<Box<dyn Context>> {
        if !self.available {
            return Err(Error::unavailable(self.name));
        }
        Ok(Box::new(Echo {
            prelude: prelude.to_string(),
        }))
    }
}

struct Echo {
    prelude: String,
}

impl Context for Echo {
    fn exec(&mut self, source: &str) -> Result<Value> {
        Ok(Value::String(format!("{}{source}", self.prelude)))
    }

    fn eval(&mut self, source: &str) -> Result<Value> {
        self.exec(source)
    }
}
