use storefront_core::Product;

/// A product with a predictable name, category and image.
pub fn product(id: &str, cost: f64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        category: "General".to_string(),
        cost,
        rating: 4.0,
        image_url: format!("https://images.example.com/{id}.jpg"),
    }
}

fn named(id: &str, name: &str, category: &str, cost: f64, rating: f64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        cost,
        rating,
        image_url: format!("https://images.example.com/{id}.jpg"),
    }
}

/// A small catalog with searchable names and categories.
pub fn sample_catalog() -> Vec<Product> {
    vec![
        named("BW0jAAeDJmlZCF8i", "Apple iPhone XR", "Phones", 100.0, 4.0),
        named("KCRwjF7lN97HnEaY", "Basketball", "Sports", 50.0, 5.0),
        named("a4sLtEcMpzabRyfx", "Applewood Table", "Home & Kitchen", 300.0, 3.0),
        named("upLK9JbQ4rMhTwt4", "YONEX Smash Badminton Racquet", "Sports", 100.0, 5.0),
        named("v4sLtEcMpzabRyfx", "Tan Leatherette Weekender Duffle", "Fashion", 150.0, 4.0),
    ]
}
