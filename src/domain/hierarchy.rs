// Dimension hierarchies - option trees and hierarchical filter selections
use serde::Deserialize;
use thiserror::Error;

/// The two independent slicing axes the data service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// part -> channel -> account
    Channel,
    /// group -> category -> sub-category
    Product,
}

impl Dimension {
    /// Query parameter names the data service expects for the three
    /// levels of this dimension.
    pub fn wire_params(self) -> [&'static str; 3] {
        match self {
            Dimension::Channel => ["part", "channel", "account"],
            Dimension::Product => ["group", "category", "sub_category"],
        }
    }
}

/// One level of a selection: either a concrete value or the wildcard
/// ("no filter at this level"). The wire contract still spells the
/// wildcard as the string "all".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LevelValue {
    #[default]
    Wildcard,
    Value(String),
}

impl LevelValue {
    pub fn from_wire(raw: &str) -> Self {
        if raw.is_empty() || raw == "all" {
            LevelValue::Wildcard
        } else {
            LevelValue::Value(raw.to_string())
        }
    }

    pub fn wire(&self) -> &str {
        match self {
            LevelValue::Wildcard => "all",
            LevelValue::Value(v) => v,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, LevelValue::Wildcard)
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            LevelValue::Wildcard => None,
            LevelValue::Value(v) => Some(v),
        }
    }
}

/// A rejected selection transition. The selection is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("cannot select a {child} value while {ancestor} is a wildcard")]
    AncestorNotConcrete {
        child: &'static str,
        ancestor: &'static str,
    },
    #[error("'{value}' is not an option under the selected {parent}")]
    ValueNotInTree {
        parent: &'static str,
        value: String,
    },
}

/// A path through a dimension hierarchy. Invariant: a level may only be
/// concrete when every ancestor level is concrete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionSelection {
    level1: LevelValue,
    level2: LevelValue,
    level3: LevelValue,
}

impl DimensionSelection {
    /// Build from raw wire values ("all", "" and absent all mean
    /// wildcard). Child values whose ancestor is a wildcard are
    /// demoted to wildcard to uphold the invariant.
    pub fn from_wire(level1: Option<&str>, level2: Option<&str>, level3: Option<&str>) -> Self {
        let level1 = level1.map(LevelValue::from_wire).unwrap_or_default();
        let mut level2 = level2.map(LevelValue::from_wire).unwrap_or_default();
        let mut level3 = level3.map(LevelValue::from_wire).unwrap_or_default();
        if level1.is_wildcard() {
            level2 = LevelValue::Wildcard;
        }
        if level2.is_wildcard() {
            level3 = LevelValue::Wildcard;
        }
        Self {
            level1,
            level2,
            level3,
        }
    }

    pub fn level1(&self) -> &LevelValue {
        &self.level1
    }

    pub fn level2(&self) -> &LevelValue {
        &self.level2
    }

    pub fn level3(&self) -> &LevelValue {
        &self.level3
    }

    /// Changing the top level always succeeds and resets both
    /// descendant levels to wildcard.
    pub fn set_level1(&mut self, value: LevelValue) {
        self.level1 = value;
        self.level2 = LevelValue::Wildcard;
        self.level3 = LevelValue::Wildcard;
    }

    /// Changing the middle level resets level3. A concrete value is
    /// rejected when level1 is a wildcard or the value is not listed
    /// under the selected level1 in the tree.
    pub fn set_level2(
        &mut self,
        tree: &DimensionTree,
        value: LevelValue,
    ) -> Result<(), SelectionError> {
        if let LevelValue::Value(v) = &value {
            let parent = self
                .level1
                .as_value()
                .ok_or(SelectionError::AncestorNotConcrete {
                    child: "level2",
                    ancestor: "level1",
                })?;
            if !tree.level2_options(parent).contains(&v.as_str()) {
                return Err(SelectionError::ValueNotInTree {
                    parent: "level1",
                    value: v.clone(),
                });
            }
        }
        self.level2 = value;
        self.level3 = LevelValue::Wildcard;
        Ok(())
    }

    /// Changing the leaf level leaves ancestors untouched. A concrete
    /// value requires both ancestors concrete and membership under
    /// them in the tree.
    pub fn set_level3(
        &mut self,
        tree: &DimensionTree,
        value: LevelValue,
    ) -> Result<(), SelectionError> {
        if let LevelValue::Value(v) = &value {
            let (l1, l2) = match (self.level1.as_value(), self.level2.as_value()) {
                (Some(l1), Some(l2)) => (l1, l2),
                (None, _) => {
                    return Err(SelectionError::AncestorNotConcrete {
                        child: "level3",
                        ancestor: "level1",
                    })
                }
                (_, None) => {
                    return Err(SelectionError::AncestorNotConcrete {
                        child: "level3",
                        ancestor: "level2",
                    })
                }
            };
            if !tree.level3_options(l1, l2).contains(v) {
                return Err(SelectionError::ValueNotInTree {
                    parent: "level2",
                    value: v.clone(),
                });
            }
        }
        self.level3 = value;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Level2Node {
    name: String,
    leaves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Level1Node {
    name: String,
    children: Vec<Level2Node>,
}

/// Three-level option tree supplied by the data service per dataset.
/// Read-only to this core; iteration order is the service's insertion
/// order and is preserved for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionTree {
    roots: Vec<Level1Node>,
}

impl DimensionTree {
    /// Parse the service's nested mapping (level1 -> level2 ->
    /// [level3]). Requires serde_json's preserve_order feature so map
    /// iteration follows the wire order. Non-conforming nodes are
    /// skipped rather than failing the whole tree.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut tree = Self::default();
        let Some(level1_map) = value.as_object() else {
            return tree;
        };
        for (level1, level2_value) in level1_map {
            let Some(level2_map) = level2_value.as_object() else {
                continue;
            };
            for (level2, leaves_value) in level2_map {
                let leaves = leaves_value
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_owned))
                            .collect()
                    })
                    .unwrap_or_default();
                tree.insert(level1, level2, leaves);
            }
        }
        tree
    }

    fn insert(&mut self, level1: &str, level2: &str, leaves: Vec<String>) {
        let root_idx = match self.roots.iter().position(|r| r.name == level1) {
            Some(i) => i,
            None => {
                self.roots.push(Level1Node {
                    name: level1.to_string(),
                    children: Vec::new(),
                });
                self.roots.len() - 1
            }
        };
        let root = &mut self.roots[root_idx];
        match root.children.iter_mut().find(|c| c.name == level2) {
            Some(child) => child.leaves.extend(leaves),
            None => root.children.push(Level2Node {
                name: level2.to_string(),
                leaves,
            }),
        }
    }

    pub fn level1_options(&self) -> Vec<&str> {
        self.roots.iter().map(|r| r.name.as_str()).collect()
    }

    /// Ordered level2 keys under `level1`; empty when absent.
    pub fn level2_options(&self, level1: &str) -> Vec<&str> {
        self.roots
            .iter()
            .find(|r| r.name == level1)
            .map(|r| r.children.iter().map(|c| c.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Ordered level3 values under `level1`/`level2`; empty when absent.
    pub fn level3_options(&self, level1: &str, level2: &str) -> &[String] {
        self.roots
            .iter()
            .find(|r| r.name == level1)
            .and_then(|r| r.children.iter().find(|c| c.name == level2))
            .map(|c| c.leaves.as_slice())
            .unwrap_or(&[])
    }

    /// Render back to the nested-mapping wire shape, preserving order.
    pub fn to_json(&self) -> serde_json::Value {
        let mut level1_map = serde_json::Map::new();
        for root in &self.roots {
            let mut level2_map = serde_json::Map::new();
            for child in &root.children {
                level2_map.insert(
                    child.name.clone(),
                    serde_json::Value::from(child.leaves.clone()),
                );
            }
            level1_map.insert(root.name.clone(), serde_json::Value::Object(level2_map));
        }
        serde_json::Value::Object(level1_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn channel_tree() -> DimensionTree {
        DimensionTree::from_json(&json!({
            "online": {
                "naver": ["smartstore", "brandstore"],
                "coupang": ["rocket"],
            },
            "offline": {
                "wholesale": ["vendor-a"],
            },
        }))
    }

    #[test]
    fn tree_preserves_service_order() {
        let tree = channel_tree();
        assert_eq!(tree.level1_options(), vec!["online", "offline"]);
        assert_eq!(tree.level2_options("online"), vec!["naver", "coupang"]);
        assert_eq!(
            tree.level3_options("online", "naver"),
            ["smartstore", "brandstore"]
        );
    }

    #[test]
    fn options_of_unknown_parent_are_empty() {
        let tree = channel_tree();
        assert!(tree.level2_options("nope").is_empty());
        assert!(tree.level3_options("online", "nope").is_empty());
    }

    #[test]
    fn tree_round_trips_through_json() {
        let tree = channel_tree();
        assert_eq!(DimensionTree::from_json(&tree.to_json()), tree);
    }

    #[test]
    fn changing_level1_resets_descendants() {
        let tree = channel_tree();
        let mut selection = DimensionSelection::default();
        selection.set_level1(LevelValue::Value("online".into()));
        selection
            .set_level2(&tree, LevelValue::Value("naver".into()))
            .unwrap();
        selection
            .set_level3(&tree, LevelValue::Value("smartstore".into()))
            .unwrap();

        selection.set_level1(LevelValue::Value("offline".into()));
        assert!(selection.level2().is_wildcard());
        assert!(selection.level3().is_wildcard());
    }

    #[test]
    fn child_selection_requires_concrete_ancestor() {
        let tree = channel_tree();
        let mut selection = DimensionSelection::default();
        let err = selection
            .set_level2(&tree, LevelValue::Value("naver".into()))
            .unwrap_err();
        assert!(matches!(err, SelectionError::AncestorNotConcrete { .. }));
        assert_eq!(selection, DimensionSelection::default());
    }

    #[test]
    fn child_selection_must_exist_under_ancestor() {
        let tree = channel_tree();
        let mut selection = DimensionSelection::default();
        selection.set_level1(LevelValue::Value("offline".into()));
        let err = selection
            .set_level2(&tree, LevelValue::Value("naver".into()))
            .unwrap_err();
        assert_eq!(
            err,
            SelectionError::ValueNotInTree {
                parent: "level1",
                value: "naver".into()
            }
        );
        // Rejection leaves the selection untouched.
        assert!(selection.level2().is_wildcard());
    }

    #[test]
    fn setting_level2_resets_level3() {
        let tree = channel_tree();
        let mut selection = DimensionSelection::default();
        selection.set_level1(LevelValue::Value("online".into()));
        selection
            .set_level2(&tree, LevelValue::Value("naver".into()))
            .unwrap();
        selection
            .set_level3(&tree, LevelValue::Value("smartstore".into()))
            .unwrap();
        selection
            .set_level2(&tree, LevelValue::Value("coupang".into()))
            .unwrap();
        assert!(selection.level3().is_wildcard());
    }

    #[test]
    fn wire_values_normalize_to_wildcard() {
        assert!(LevelValue::from_wire("all").is_wildcard());
        assert!(LevelValue::from_wire("").is_wildcard());
        assert_eq!(LevelValue::from_wire("naver").wire(), "naver");
        assert_eq!(LevelValue::Wildcard.wire(), "all");
    }

    #[test]
    fn from_wire_demotes_orphaned_children() {
        let selection = DimensionSelection::from_wire(Some("all"), Some("naver"), Some("rocket"));
        assert!(selection.level2().is_wildcard());
        assert!(selection.level3().is_wildcard());

        let selection = DimensionSelection::from_wire(Some("online"), None, Some("rocket"));
        assert!(selection.level3().is_wildcard());
    }
}
