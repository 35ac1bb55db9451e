//! Reconciling a product's complement-group links.

use crate::catalog::{NewProductComplementGroup, ProductComplementGroup};
use crate::ids::{ComplementGroupId, ProductComplementGroupId, ProductId};
use std::collections::HashSet;

/// Changes that turn the current link set into the desired one.
///
/// The desired list is ordered; a group's position becomes its
/// `sort_order`. Repeated group ids keep their first position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkDiff {
    pub to_insert: Vec<NewProductComplementGroup>,
    pub to_delete: Vec<ProductComplementGroupId>,
    /// Existing links whose position changed, with the new `sort_order`.
    pub to_reorder: Vec<(ProductComplementGroupId, i32)>,
}

impl LinkDiff {
    pub fn compute(
        product_id: &ProductId,
        current: &[ProductComplementGroup],
        desired: &[ComplementGroupId],
    ) -> Self {
        let mut seen = HashSet::new();
        let desired: Vec<&ComplementGroupId> =
            desired.iter().filter(|id| seen.insert(*id)).collect();

        let mut diff = LinkDiff::default();
        let mut kept = HashSet::new();
        for link in current {
            let position = desired.iter().position(|id| **id == link.group_id);
            match position {
                Some(pos) if kept.insert(link.group_id.clone()) => {
                    let sort_order = pos as i32;
                    if link.sort_order != sort_order {
                        diff.to_reorder.push((link.id.clone(), sort_order));
                    }
                }
                // Unwanted, or a duplicate link to a group already kept.
                _ => diff.to_delete.push(link.id.clone()),
            }
        }

        for (pos, group_id) in desired.iter().enumerate() {
            if !kept.contains(*group_id) {
                diff.to_insert.push(NewProductComplementGroup {
                    product_id: product_id.clone(),
                    group_id: (*group_id).clone(),
                    sort_order: pos as i32,
                });
            }
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty() && self.to_reorder.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn link(group: &str, sort_order: i32) -> ProductComplementGroup {
        ProductComplementGroup {
            id: ProductComplementGroupId::new(format!("link-{}", group)),
            product_id: ProductId::new("p1"),
            group_id: ComplementGroupId::new(group),
            sort_order,
            created_at: Utc::now(),
        }
    }

    fn ids(groups: &[&str]) -> Vec<ComplementGroupId> {
        groups.iter().map(|g| ComplementGroupId::new(*g)).collect()
    }

    #[test]
    fn test_diff_insert_delete_reorder() {
        let current = vec![link("bordas", 0), link("molhos", 1), link("extras", 2)];
        let diff = LinkDiff::compute(
            &ProductId::new("p1"),
            &current,
            &ids(&["extras", "bordas", "bebidas"]),
        );

        assert_eq!(diff.to_delete, vec![ProductComplementGroupId::new("link-molhos")]);
        assert_eq!(
            diff.to_reorder,
            vec![
                (ProductComplementGroupId::new("link-bordas"), 1),
                (ProductComplementGroupId::new("link-extras"), 0),
            ]
        );
        assert_eq!(diff.to_insert.len(), 1);
        assert_eq!(diff.to_insert[0].group_id, ComplementGroupId::new("bebidas"));
        assert_eq!(diff.to_insert[0].sort_order, 2);
    }

    #[test]
    fn test_same_set_is_empty() {
        let current = vec![link("bordas", 0), link("extras", 1)];
        let diff = LinkDiff::compute(&ProductId::new("p1"), &current, &ids(&["bordas", "extras"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut dup = link("bordas", 0);
        dup.id = ProductComplementGroupId::new("link-bordas-2");
        let current = vec![link("bordas", 0), dup];
        let diff = LinkDiff::compute(
            &ProductId::new("p1"),
            &current,
            &ids(&["bordas", "bordas"]),
        );
        assert_eq!(diff.to_delete, vec![ProductComplementGroupId::new("link-bordas-2")]);
        assert!(diff.to_insert.is_empty());
        assert!(diff.to_reorder.is_empty());
    }

    #[test]
    fn test_clear_all() {
        let current = vec![link("bordas", 0)];
        let diff = LinkDiff::compute(&ProductId::new("p1"), &current, &[]);
        assert_eq!(diff.to_delete.len(), 1);
        assert!(diff.to_insert.is_empty());
    }
}
