//! Shaping of the public menu and product detail views.

use crate::catalog::{
    Category, Complement, ComplementGroup, ComplementGroupWithComplements, Product,
    ProductComplementGroup,
};
use crate::ids::{ComplementGroupId, ComplementId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A category with its active products, as shown on the menu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuCategory {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// A product with the complement groups offered for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    /// Active groups in link order, each with its active complements.
    pub complement_groups: Vec<ComplementGroupWithComplements>,
}

impl ProductDetail {
    /// Find an offered group by id.
    pub fn group(&self, id: &ComplementGroupId) -> Option<&ComplementGroupWithComplements> {
        self.complement_groups.iter().find(|g| &g.group.id == id)
    }

    /// Find an offered complement and the group it belongs to.
    pub fn complement(
        &self,
        id: &ComplementId,
    ) -> Option<(&ComplementGroupWithComplements, &Complement)> {
        self.complement_groups
            .iter()
            .find_map(|g| g.complement(id).map(|c| (g, c)))
    }
}

/// Join categories to products, keeping only active rows and dropping
/// categories left without products.
///
/// Input order is preserved on both levels.
pub fn build_menu(categories: Vec<Category>, products: Vec<Product>) -> Vec<MenuCategory> {
    let mut by_category: HashMap<_, Vec<Product>> = HashMap::new();
    for product in products.into_iter().filter(|p| p.is_active) {
        if let Some(category_id) = product.category_id.clone() {
            by_category.entry(category_id).or_default().push(product);
        }
    }

    categories
        .into_iter()
        .filter(|c| c.is_active)
        .filter_map(|category| {
            let products = by_category.remove(&category.id)?;
            Some(MenuCategory { category, products })
        })
        .collect()
}

/// Assemble a product detail from the joined rows.
///
/// Links are walked in `sort_order`; groups that are missing or inactive
/// are skipped. Complements are filtered to active ones and sorted by
/// `sort_order` then name.
pub fn build_product_detail(
    product: Product,
    mut links: Vec<ProductComplementGroup>,
    groups: Vec<ComplementGroup>,
    complements: Vec<Complement>,
) -> ProductDetail {
    links.sort_by_key(|l| l.sort_order);

    let mut groups: HashMap<_, _> = groups
        .into_iter()
        .filter(|g| g.is_active)
        .map(|g| (g.id.clone(), g))
        .collect();

    let mut options: HashMap<ComplementGroupId, Vec<Complement>> = HashMap::new();
    for complement in complements.into_iter().filter(|c| c.is_active) {
        options
            .entry(complement.group_id.clone())
            .or_default()
            .push(complement);
    }

    let complement_groups = links
        .iter()
        .filter_map(|link| {
            let group = groups.remove(&link.group_id)?;
            let mut complements = options.remove(&link.group_id).unwrap_or_default();
            complements.sort_by(|a, b| {
                a.sort_order
                    .cmp(&b.sort_order)
                    .then_with(|| a.name.cmp(&b.name))
            });
            Some(ComplementGroupWithComplements { group, complements })
        })
        .collect();

    ProductDetail {
        product,
        complement_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ProductComplementGroupId, ProductId};
    use crate::money::Money;
    use chrono::Utc;

    fn link(product: &ProductId, group: &ComplementGroup, sort_order: i32) -> ProductComplementGroup {
        ProductComplementGroup {
            id: ProductComplementGroupId::generate(),
            product_id: product.clone(),
            group_id: group.id.clone(),
            sort_order,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_menu_drops_empty_and_inactive() {
        let pizzas = Category::new("Pizzas");
        let bebidas = Category::new("Bebidas").with_sort_order(1);
        let mut hidden = Category::new("Antigos");
        hidden.is_active = false;

        let mut retired = Product::new("Calzone", Money::new(3000)).with_category(bebidas.id.clone());
        retired.is_active = false;
        let products = vec![
            Product::new("Margherita", Money::new(4000)).with_category(pizzas.id.clone()),
            retired,
            Product::new("Antiga", Money::new(100)).with_category(hidden.id.clone()),
            Product::new("Avulso", Money::new(100)),
        ];

        let menu = build_menu(vec![pizzas.clone(), bebidas, hidden], products);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].category.id, pizzas.id);
        assert_eq!(menu[0].products.len(), 1);
    }

    #[test]
    fn test_detail_filters_and_orders_groups() {
        let product = Product::new("Pizza", Money::new(4000));
        let bordas = ComplementGroup::new("Bordas");
        let extras = ComplementGroup::new("Extras").optional(3);
        let mut old = ComplementGroup::new("Antigo");
        old.is_active = false;

        let links = vec![
            link(&product.id, &extras, 2),
            link(&product.id, &old, 0),
            link(&product.id, &bordas, 1),
        ];
        let mut gone = Complement::new(extras.id.clone(), "Bacon", Money::new(400));
        gone.is_active = false;
        let complements = vec![
            Complement::new(extras.id.clone(), "Milho", Money::new(200)).with_sort_order(1),
            Complement::new(extras.id.clone(), "Azeitona", Money::new(200)).with_sort_order(1),
            Complement::new(extras.id.clone(), "Ovo", Money::new(300)),
            gone,
            Complement::new(old.id.clone(), "Velho", Money::new(100)),
        ];

        let detail = build_product_detail(
            product,
            links,
            vec![bordas.clone(), extras.clone(), old],
            complements,
        );

        let names: Vec<_> = detail
            .complement_groups
            .iter()
            .map(|g| g.group.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bordas", "Extras"]);

        let extras = detail.group(&extras.id).unwrap();
        let options: Vec<_> = extras.complements.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(options, vec!["Ovo", "Azeitona", "Milho"]);
        assert!(detail.group(&bordas.id).unwrap().complements.is_empty());
    }
}
