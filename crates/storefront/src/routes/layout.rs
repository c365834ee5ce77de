//! Page chrome shared by every full page: header state and pending notices.

use qkart_core::{CartItem, Product};

use crate::models::{Notice, SessionUser};

/// Header and notice data for the base layout.
pub struct Chrome {
    /// Username of the logged-in user, if any.
    pub username: Option<String>,
    /// Show "Back to explore" instead of the login/register buttons.
    pub hide_auth_buttons: bool,
    /// Notices rendered as snackbars on load.
    pub notices: Vec<Notice>,
}

impl Chrome {
    /// Chrome for a page that shows the auth buttons.
    #[must_use]
    pub fn new(user: Option<&SessionUser>, flash: Option<Notice>) -> Self {
        Self {
            username: user.map(|u| u.username.clone()),
            hide_auth_buttons: false,
            notices: flash.into_iter().collect(),
        }
    }

    /// Chrome for login, register, checkout, and thanks.
    #[must_use]
    pub fn without_auth_buttons(user: Option<&SessionUser>, flash: Option<Notice>) -> Self {
        Self {
            hide_auth_buttons: true,
            ..Self::new(user, flash)
        }
    }

    /// Queue another notice.
    pub fn push(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Product card display data.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub cost: String,
    pub stars: String,
    pub rating: u8,
    pub image: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            cost: product.cost.to_string(),
            stars: render_stars(product.stars()),
            rating: product.stars(),
            image: product.image.clone(),
        }
    }
}

/// Cart line display data.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub cost: String,
    pub qty: u32,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            cost: item.cost.to_string(),
            qty: item.qty,
        }
    }
}

/// `★★★☆☆`-style rating.
fn render_stars(filled: u8) -> String {
    let filled = filled.min(Product::MAX_RATING);
    let mut stars = "★".repeat(usize::from(filled));
    stars.push_str(&"☆".repeat(usize::from(Product::MAX_RATING - filled)));
    stars
}

#[cfg(test)]
mod tests {
    use qkart_core::{Cost, ProductId};

    use super::*;

    #[test]
    fn test_render_stars() {
        assert_eq!(render_stars(0), "☆☆☆☆☆");
        assert_eq!(render_stars(3), "★★★☆☆");
        assert_eq!(render_stars(9), "★★★★★");
    }

    #[test]
    fn test_product_view() {
        let product = Product {
            id: ProductId::new("BW0jAAeDJmlZCF8i"),
            name: "Tan Leatherette Weekender Duffle".to_string(),
            category: "Fashion".to_string(),
            cost: Cost::from_units(150),
            rating: 4,
            image: "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/ff071a1c.png".to_string(),
        };

        let view = ProductView::from(&product);
        assert_eq!(view.id, "BW0jAAeDJmlZCF8i");
        assert_eq!(view.cost, "$150");
        assert_eq!(view.stars, "★★★★☆");
    }

    #[test]
    fn test_chrome_hides_auth_buttons() {
        let chrome = Chrome::without_auth_buttons(None, Some(Notice::info("hi")));
        assert!(chrome.hide_auth_buttons);
        assert!(chrome.username.is_none());
        assert_eq!(chrome.notices.len(), 1);
    }
}
