// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Module registry: the runtime context that owns every long-lived subsystem.
//!
//! Modules tick in descending priority and shut down in ascending priority,
//! so a module that depends on a lower-priority one is torn down first.

use std::any::Any;
use std::time::Duration;

use crate::error::{CoreError, Result};
use crate::time::Time;

/// Long-lived subsystem driven by the registry
pub trait Module: Any {
    /// Module name for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Higher priority ticks earlier and shuts down later
    fn priority(&self) -> i32 {
        0
    }

    /// Per-frame tick with logical and real elapsed seconds
    fn update(&mut self, elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()>;

    /// Tear down; called once, in reverse tick order
    fn shutdown(&mut self);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Priority-ordered collection of modules
pub struct ModuleRegistry {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module. One instance per concrete type.
    pub fn register<M: Module>(&mut self, module: M) -> Result<&mut M> {
        if self.contains::<M>() {
            return Err(CoreError::InvalidState(format!(
                "Module '{}' is already registered",
                module.name()
            )));
        }

        let priority = module.priority();
        tracing::debug!(module = module.name(), priority, "registering module");

        // Equal priorities keep registration order
        let index = self
            .modules
            .iter()
            .position(|m| priority > m.priority())
            .unwrap_or(self.modules.len());
        self.modules.insert(index, Box::new(module));

        self.modules[index]
            .as_any_mut()
            .downcast_mut::<M>()
            .ok_or_else(|| CoreError::InvalidState("Module type mismatch".to_string()))
    }

    pub fn contains<M: Module>(&self) -> bool {
        self.modules.iter().any(|m| m.as_any().is::<M>())
    }

    pub fn get<M: Module>(&self) -> Option<&M> {
        self.modules
            .iter()
            .find_map(|m| m.as_any().downcast_ref::<M>())
    }

    pub fn get_mut<M: Module>(&mut self) -> Option<&mut M> {
        self.modules
            .iter_mut()
            .find_map(|m| m.as_any_mut().downcast_mut::<M>())
    }

    /// Module names in tick order
    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Tick every module in descending priority
    pub fn update(&mut self, elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()> {
        for module in self.modules.iter_mut() {
            module.update(elapse_seconds, real_elapse_seconds)?;
        }
        Ok(())
    }

    /// Advance `time` by `real` and tick with the resulting frame pair
    pub fn tick(&mut self, time: &mut Time, real: Duration) -> Result<()> {
        let frame = time.advance(real);
        self.update(frame.elapse_seconds, frame.real_elapse_seconds)
    }

    /// Shut every module down in ascending priority and drop them
    pub fn shutdown(&mut self) {
        for module in self.modules.iter_mut().rev() {
            tracing::debug!(module = module.name(), "shutting down module");
            module.shutdown();
        }
        self.modules.clear();
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    macro_rules! test_module {
        ($name:ident, $priority:expr) => {
            struct $name(Journal);

            impl Module for $name {
                fn name(&self) -> &str {
                    stringify!($name)
                }
                fn priority(&self) -> i32 {
                    $priority
                }
                fn update(&mut self, _elapse: f32, _real: f32) -> Result<()> {
                    self.0.borrow_mut().push(format!("update {}", stringify!($name)));
                    Ok(())
                }
                fn shutdown(&mut self) {
                    self.0
                        .borrow_mut()
                        .push(format!("shutdown {}", stringify!($name)));
                }
                fn as_any(&self) -> &dyn Any {
                    self
                }
                fn as_any_mut(&mut self) -> &mut dyn Any {
                    self
                }
            }
        };
    }

    test_module!(Low, 1);
    test_module!(High, 90);
    test_module!(Mid, 5);
    test_module!(MidToo, 5);

    #[test]
    fn test_tick_in_descending_priority() {
        let journal = Journal::default();
        let mut registry = ModuleRegistry::new();
        registry.register(Low(journal.clone())).unwrap();
        registry.register(Mid(journal.clone())).unwrap();
        registry.register(High(journal.clone())).unwrap();
        registry.register(MidToo(journal.clone())).unwrap();

        registry.update(0.016, 0.016).unwrap();
        assert_eq!(
            *journal.borrow(),
            vec!["update High", "update Mid", "update MidToo", "update Low"]
        );
    }

    #[test]
    fn test_shutdown_in_reverse_order() {
        let journal = Journal::default();
        let mut registry = ModuleRegistry::new();
        registry.register(High(journal.clone())).unwrap();
        registry.register(Low(journal.clone())).unwrap();
        registry.register(Mid(journal.clone())).unwrap();

        registry.shutdown();
        assert_eq!(
            *journal.borrow(),
            vec!["shutdown Low", "shutdown Mid", "shutdown High"]
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let journal = Journal::default();
        let mut registry = ModuleRegistry::new();
        registry.register(Low(journal.clone())).unwrap();
        let err = registry.register(Low(journal)).err().unwrap();
        assert!(matches!(err, CoreError::InvalidState(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_by_type() {
        let journal = Journal::default();
        let mut registry = ModuleRegistry::new();
        registry.register(Mid(journal.clone())).unwrap();
        assert!(registry.get::<Mid>().is_some());
        assert!(registry.get_mut::<High>().is_none());
    }

    #[test]
    fn test_tick_advances_time() {
        let journal = Journal::default();
        let mut registry = ModuleRegistry::new();
        registry.register(Low(journal.clone())).unwrap();
        let mut time = Time::new();
        registry
            .tick(&mut time, Duration::from_millis(16))
            .unwrap();
        assert_eq!(time.frame_count(), 1);
        assert_eq!(journal.borrow().len(), 1);
    }
}
