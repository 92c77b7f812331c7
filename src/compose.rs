//! Attribute composition
//!
//! Folds a kind's own declarations together with its ancestors', the
//! subproperty table and its equivalent kinds into the single
//! property -> attribute-name mapping used to build queries and to read
//! their results.

use crate::error::MetaError;
use crate::kind::{Kind, KindRegistry, SubpropertyTable};

/// Ordered property -> attribute name mapping
///
/// Both properties and names are unique. Entries keep insertion order so
/// that generated queries are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(&'static str, &'static str)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the name of `property`
    ///
    /// Any other property currently using `name` loses it.
    pub fn set(&mut self, property: &'static str, name: &'static str) {
        self.entries.retain(|(p, n)| *p != property && *n != name);
        self.entries.push((property, name));
    }

    /// Insert only if neither the property nor the name is taken
    pub fn insert_if_absent(&mut self, property: &'static str, name: &'static str) -> bool {
        if self.contains_property(property) || self.contains_name(name) {
            return false;
        }
        self.entries.push((property, name));
        true
    }

    /// Merge another map in without overwriting anything already present
    pub fn merge_absent(&mut self, other: &AttributeMap) {
        for (property, name) in other.iter() {
            self.insert_if_absent(property, name);
        }
    }

    pub fn get(&self, property: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, n)| *n)
    }

    pub fn property_of(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(p, _)| *p)
    }

    pub fn contains_property(&self, property: &str) -> bool {
        self.entries.iter().any(|(p, _)| *p == property)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|(_, n)| *n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(_, n)| *n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compose the full attribute mapping of a kind
///
/// Merge order: own declarations, then ancestors nearest first (never
/// overwriting), then subproperty expansion, then equivalent kinds (never
/// overwriting). Cycles through parents or equivalents fail with
/// `CompositionCycle`.
pub fn compose(registry: &KindRegistry, kind: &Kind) -> Result<AttributeMap, MetaError> {
    let mut stack = Vec::new();
    compose_inner(registry, kind, &mut stack)
}

fn compose_inner(
    registry: &KindRegistry,
    kind: &Kind,
    stack: &mut Vec<&'static str>,
) -> Result<AttributeMap, MetaError> {
    if stack.contains(&kind.name) {
        return Err(MetaError::CompositionCycle(kind.name.to_string()));
    }
    stack.push(kind.name);

    let mut map = AttributeMap::new();

    // Within one kind the last declaration of a property wins
    for &(property, name) in kind.own_attributes {
        map.set(property, name);
    }

    let mut lineage = vec![kind.name];
    let mut parent = kind.parent;
    while let Some(parent_name) = parent {
        if lineage.contains(&parent_name) {
            return Err(MetaError::CompositionCycle(parent_name.to_string()));
        }
        lineage.push(parent_name);

        let ancestor = registry.lookup_by_name(parent_name)?;
        for &(property, name) in ancestor.own_attributes {
            map.insert_if_absent(property, name);
        }
        parent = ancestor.parent;
    }

    expand_subproperties(&mut map, registry.subproperties());

    for equivalent in kind.equivalent_kinds {
        let equivalent = registry.lookup_by_name(equivalent)?;
        let equivalent_map = compose_inner(registry, equivalent, stack)?;
        map.merge_absent(&equivalent_map);
    }

    stack.pop();
    Ok(map)
}

/// Add the children of every composite property present in the map
///
/// Children that are themselves composite are expanded in turn.
fn expand_subproperties(map: &mut AttributeMap, table: &SubpropertyTable) {
    let mut index = 0;
    while index < map.len() {
        let (property, _) = map.entries[index];
        if let Some(children) = table.children(property) {
            for &(child, name) in children {
                map.insert_if_absent(child, name);
            }
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;

    fn registry(kinds: Vec<Kind>, table: SubpropertyTable) -> KindRegistry {
        KindRegistry::new(kinds, table).unwrap()
    }

    #[test]
    fn test_attribute_map_uniqueness() {
        let mut map = AttributeMap::new();
        assert!(map.insert_if_absent("rdfs:label", "label"));
        assert!(!map.insert_if_absent("rdfs:label", "other"));
        assert!(!map.insert_if_absent("cpmeta:hasName", "label"));

        map.set("cpmeta:hasName", "label");
        assert_eq!(map.len(), 1);
        assert_eq!(map.property_of("label"), Some("cpmeta:hasName"));
    }

    #[test]
    fn test_specificity_wins_over_ancestor() {
        let registry = registry(
            vec![
                Kind::new("A", None, "http://x/A", &[("rdfs:label", "label"), ("rdfs:comment", "comment")]),
                Kind::new("B", Some("A"), "http://x/B", &[("rdfs:label", "bLabel")]),
            ],
            SubpropertyTable::new(),
        );
        let b = registry.lookup_by_name("B").unwrap();
        let map = compose(&registry, b).unwrap();

        assert_eq!(map.get("rdfs:label"), Some("bLabel"));
        assert_eq!(map.get("rdfs:comment"), Some("comment"));
        assert!(!map.contains_name("label"));
    }

    #[test]
    fn test_last_own_declaration_wins() {
        let registry = registry(
            vec![Kind::new(
                "A",
                None,
                "http://x/A",
                &[("rdfs:label", "first"), ("rdfs:label", "second")],
            )],
            SubpropertyTable::new(),
        );
        let map = compose(&registry, registry.lookup_by_name("A").unwrap()).unwrap();
        assert_eq!(map.get("rdfs:label"), Some("second"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_ancestor_name_clash_is_skipped() {
        let registry = registry(
            vec![
                Kind::new("A", None, "http://x/A", &[("rdfs:label", "name")]),
                Kind::new("B", Some("A"), "http://x/B", &[("cpmeta:hasName", "name")]),
            ],
            SubpropertyTable::new(),
        );
        let map = compose(&registry, registry.lookup_by_name("B").unwrap()).unwrap();
        assert_eq!(map.property_of("name"), Some("cpmeta:hasName"));
        assert!(!map.contains_property("rdfs:label"));
    }

    #[test]
    fn test_subproperty_expansion() {
        let table = SubpropertyTable::new()
            .declare(
                "cpmeta:hasPolicy",
                &[
                    ("cpmeta:hideFromSearchPolicy", "hideFromSearchPolicy"),
                    ("cpmeta:skipPidMintingPolicy", "skipPidMintingPolicy"),
                ],
            )
            .declare("cpmeta:skipPidMintingPolicy", &[("cpmeta:skipDoiPolicy", "skipDoiPolicy")]);
        let registry = registry(
            vec![
                Kind::new("Project", None, "http://x/P", &[("cpmeta:hasPolicy", "policy")]),
                Kind::new("Sub", Some("Project"), "http://x/S", &[]),
            ],
            table,
        );

        for name in ["Project", "Sub"] {
            let map = compose(&registry, registry.lookup_by_name(name).unwrap()).unwrap();
            assert!(map.contains_name("policy"));
            assert!(map.contains_name("hideFromSearchPolicy"));
            assert!(map.contains_name("skipPidMintingPolicy"));
            assert!(map.contains_name("skipDoiPolicy"));
        }
    }

    #[test]
    fn test_subproperty_does_not_overwrite_declared_child() {
        let table = SubpropertyTable::new()
            .declare("cpmeta:hasPolicy", &[("cpmeta:hideFromSearchPolicy", "hideFromSearchPolicy")]);
        let registry = registry(
            vec![Kind::new(
                "Project",
                None,
                "http://x/P",
                &[("cpmeta:hasPolicy", "policy"), ("cpmeta:hideFromSearchPolicy", "hidden")],
            )],
            table,
        );
        let map = compose(&registry, registry.lookup_by_name("Project").unwrap()).unwrap();
        assert_eq!(map.get("cpmeta:hideFromSearchPolicy"), Some("hidden"));
    }

    #[test]
    fn test_equivalent_kinds_are_additive() {
        let registry = registry(
            vec![
                Kind::new("Coverage", None, "http://x/C", &[("cpmeta:asGeoJSON", "geoJson"), ("rdfs:label", "label")])
                    .with_equivalents(&["Position"]),
                Kind::new(
                    "Position",
                    None,
                    "http://x/P",
                    &[("cpmeta:hasLatitude", "latitude"), ("rdfs:label", "positionLabel"), ("cpmeta:hasName", "geoJson")],
                ),
            ],
            SubpropertyTable::new(),
        );
        let map = compose(&registry, registry.lookup_by_name("Coverage").unwrap()).unwrap();

        assert_eq!(map.get("cpmeta:hasLatitude"), Some("latitude"));
        // Already present property and already present name are both kept
        assert_eq!(map.get("rdfs:label"), Some("label"));
        assert_eq!(map.property_of("geoJson"), Some("cpmeta:asGeoJSON"));
        assert!(!map.contains_property("cpmeta:hasName"));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let registry = KindRegistry::builtin().unwrap();
        for kind in registry.iter() {
            let first = compose(&registry, kind).unwrap();
            let second = compose(&registry, kind).unwrap();
            assert_eq!(first, second, "kind {}", kind.name);
        }
    }

    #[test]
    fn test_builtin_names_are_unique() {
        let registry = KindRegistry::builtin().unwrap();
        for kind in registry.iter() {
            let map = compose(&registry, kind).unwrap();
            let mut names: Vec<_> = map.names().collect();
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total, "kind {}", kind.name);
        }
    }

    #[test]
    fn test_parent_cycle_detected() {
        let registry = registry(
            vec![
                Kind::new("A", Some("C"), "http://x/A", &[]),
                Kind::new("B", Some("A"), "http://x/B", &[]),
                Kind::new("C", Some("B"), "http://x/C", &[]),
            ],
            SubpropertyTable::new(),
        );
        let result = compose(&registry, registry.lookup_by_name("B").unwrap());
        assert!(matches!(result, Err(MetaError::CompositionCycle(_))));
    }

    #[test]
    fn test_equivalent_cycle_detected() {
        let registry = registry(
            vec![
                Kind::new("A", None, "http://x/A", &[]).with_equivalents(&["B"]),
                Kind::new("B", None, "http://x/B", &[]).with_equivalents(&["A"]),
            ],
            SubpropertyTable::new(),
        );
        let result = compose(&registry, registry.lookup_by_name("A").unwrap());
        assert!(matches!(result, Err(MetaError::CompositionCycle(name)) if name == "A"));
    }

    #[test]
    fn test_unknown_parent() {
        let registry = registry(
            vec![Kind::new("A", Some("Ghost"), "http://x/A", &[])],
            SubpropertyTable::new(),
        );
        let result = compose(&registry, registry.lookup_by_name("A").unwrap());
        assert!(matches!(result, Err(MetaError::UnknownKind(name)) if name == "Ghost"));
    }
}
