use indexmap::IndexMap;
use netcmp_common::CompareError;

/// Swappable pin group within a template.
pub type PinClass = u32;

/// A declared device template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    /// Name as first declared.
    pub name: String,
    /// Pin names in declaration order.
    pub pins: Vec<String>,
    /// Pin class of each pin. Repeated pin names share a class; classes are
    /// numbered in order of first occurrence.
    pub pin_classes: Vec<PinClass>,
}

impl Template {
    fn new(name: &str, pins: Vec<String>, pin_keys: &[String]) -> Self {
        let mut classes: IndexMap<&str, PinClass> = IndexMap::new();
        let pin_classes = pin_keys
            .iter()
            .map(|key| {
                let next = classes.len() as PinClass;
                *classes.entry(key.as_str()).or_insert(next)
            })
            .collect();

        Self {
            name: name.to_string(),
            pins,
            pin_classes,
        }
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }
}

/// Templates keyed by their lookup name.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: IndexMap<String, Template>,
}

impl TemplateRegistry {
    /// Declares a template. `key` is the lookup form of `name`, and
    /// `pin_keys` the lookup form of each pin name.
    pub fn define(
        &mut self,
        key: String,
        name: &str,
        pins: Vec<String>,
        pin_keys: &[String],
    ) -> Result<(), CompareError> {
        if self.templates.contains_key(&key) {
            return Err(CompareError::DuplicateTemplate {
                name: name.to_string(),
            });
        }
        self.templates
            .insert(key, Template::new(name, pins, pin_keys));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Template> {
        self.templates.get(key)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pins: &[&str]) -> Vec<String> {
        pins.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_pin_classes_follow_first_occurrence() {
        let mut reg = TemplateRegistry::default();
        let pins = keys(&["sd", "g", "sd", "b"]);
        reg.define("nfet".into(), "nfet", pins.clone(), &pins).unwrap();

        let t = reg.get("nfet").unwrap();
        assert_eq!(t.pin_classes, vec![0, 1, 0, 2]);
        assert_eq!(t.pin_count(), 4);
    }

    #[test]
    fn test_duplicate_template_rejected() {
        let mut reg = TemplateRegistry::default();
        let pins = keys(&["a", "b"]);
        reg.define("res".into(), "res", pins.clone(), &pins).unwrap();

        let err = reg
            .define("res".into(), "res", pins.clone(), &pins)
            .unwrap_err();
        assert_eq!(
            err,
            CompareError::DuplicateTemplate {
                name: "res".to_string()
            }
        );
        assert_eq!(reg.len(), 1);
    }
}
