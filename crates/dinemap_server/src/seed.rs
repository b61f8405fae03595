//! Demo restaurants loaded on startup.

use dinemap_protocol::{MenuCategory, MenuItem, RestaurantId, RestaurantRecord};

fn venue(id: u64, name: &str, (lat, lng): (f64, f64), kind: &str, cuisine: &str) -> RestaurantRecord {
    RestaurantRecord {
        id: RestaurantId(id),
        name: name.into(),
        lat,
        lng,
        kind: kind.into(),
        cuisine: cuisine.into(),
        description: String::new(),
        rating: 0.0,
        price_range: "€€".into(),
        phone: String::new(),
        hours: String::new(),
        is_open: true,
        delivery: true,
        takeaway: true,
        menu: Vec::new(),
        last_updated: None,
        created_at: None,
    }
}

fn category(name: &str, items: &[(&str, f64, &str)]) -> MenuCategory {
    MenuCategory::new(
        name,
        items
            .iter()
            .map(|&(item, price, description)| MenuItem::new(item, price, description))
            .collect(),
    )
}

/// The six restaurants the demo server starts with (ids 1–6, Zürich).
pub fn demo_restaurants() -> Vec<RestaurantRecord> {
    vec![
        RestaurantRecord {
            description: "Authentische italienische Küche mit frischen Zutaten".into(),
            rating: 4.5,
            phone: "+41 44 123 4567".into(),
            hours: "11:00 - 23:00".into(),
            menu: vec![
                category(
                    "Pizza",
                    &[
                        ("Margherita", 18.50, "Tomatensauce, Mozzarella, frisches Basilikum"),
                        (
                            "Quattro Stagioni",
                            22.90,
                            "Tomaten, Mozzarella, Schinken, Champignons, Artischocken, Oliven",
                        ),
                        ("Prosciutto", 21.50, "Tomatensauce, Mozzarella, Parmaschinken, Rucola"),
                    ],
                ),
                category(
                    "Pasta",
                    &[
                        ("Spaghetti Carbonara", 19.80, "Eier, Pancetta, Parmesan, schwarzer Pfeffer"),
                        ("Penne Arrabbiata", 17.50, "Scharfe Tomatensauce mit Knoblauch und Chili"),
                    ],
                ),
                category(
                    "Getränke",
                    &[
                        ("Coca Cola", 4.50, "0.33l"),
                        ("Mineralwasser", 3.50, "0.5l"),
                    ],
                ),
            ],
            ..venue(1, "Pizzeria Bella Vista", (47.3769, 8.5417), "restaurant", "italienisch")
        },
        RestaurantRecord {
            description: "Frisches Sushi und traditionelle japanische Gerichte".into(),
            rating: 4.7,
            price_range: "€€€".into(),
            phone: "+41 44 234 5678".into(),
            hours: "17:00 - 22:30".into(),
            menu: vec![
                category(
                    "Sushi",
                    &[
                        ("Sake Nigiri", 6.50, "2 Stück Lachs Nigiri"),
                        ("California Roll", 12.90, "8 Stück mit Lachs, Avocado, Gurke"),
                        ("Rainbow Roll", 16.50, "8 Stück mit verschiedenen Fischsorten"),
                    ],
                ),
                category(
                    "Warme Gerichte",
                    &[
                        ("Chicken Teriyaki", 22.50, "Gegrilltes Hähnchen mit Teriyaki-Sauce, Reis"),
                        ("Ramen Tonkotsu", 18.90, "Schweinefleischbrühe mit Nudeln und Ei"),
                    ],
                ),
            ],
            ..venue(2, "Sushi Tokyo", (47.3667, 8.5500), "restaurant", "japanisch")
        },
        RestaurantRecord {
            description: "Saftige Burger und knusprige Pommes".into(),
            rating: 4.2,
            phone: "+41 44 345 6789".into(),
            hours: "11:00 - 02:00".into(),
            menu: vec![
                category(
                    "Burger",
                    &[
                        ("Classic Cheeseburger", 14.90, "Rindfleisch, Cheddar, Salat, Tomate, Zwiebel"),
                        ("BBQ Bacon Burger", 17.50, "Rindfleisch, Bacon, BBQ-Sauce, Zwiebeln"),
                        ("Veggie Burger", 13.90, "Gemüse-Patty, Avocado, Sprossen"),
                    ],
                ),
                category(
                    "Beilagen",
                    &[
                        ("Pommes Frites", 5.50, "Knusprige Kartoffelpommes"),
                        ("Onion Rings", 6.90, "Panierte Zwiebelringe"),
                    ],
                ),
            ],
            ..venue(3, "Burger House", (47.3784, 8.5286), "takeaway", "amerikanisch")
        },
        RestaurantRecord {
            description: "Authentische thailändische Küche mit frischen Kräutern".into(),
            rating: 4.4,
            phone: "+41 44 456 7890".into(),
            hours: "11:30 - 14:00, 17:30 - 22:00".into(),
            menu: vec![
                category(
                    "Curry",
                    &[
                        ("Green Curry", 19.50, "Grünes Curry mit Gemüse und Kokosmilch"),
                        ("Massaman Curry", 21.90, "Mildes Curry mit Kartoffeln und Erdnüssen"),
                    ],
                ),
                category(
                    "Wok",
                    &[
                        ("Pad Thai", 18.50, "Gebratene Reisnudeln mit Ei und Erdnüssen"),
                        ("Tom Yum Suppe", 12.50, "Scharfe Garnelen-Suppe mit Zitronengras"),
                    ],
                ),
            ],
            ..venue(4, "Thai Garden", (47.3741, 8.5426), "restaurant", "thailändisch")
        },
        RestaurantRecord {
            description: "Frischer Döner und türkische Spezialitäten".into(),
            rating: 4.1,
            price_range: "€".into(),
            phone: "+41 44 567 8901".into(),
            hours: "10:00 - 24:00".into(),
            menu: vec![
                category(
                    "Döner",
                    &[
                        ("Döner Kebab", 9.50, "Im Fladenbrot mit Salat und Sauce"),
                        ("Döner Teller", 15.90, "Mit Reis, Salat und Sauce"),
                        ("Dürüm", 10.50, "Im Wrap mit Salat und Sauce"),
                    ],
                ),
                category(
                    "Weitere Gerichte",
                    &[
                        ("Lahmacun", 7.50, "Türkische Pizza mit Hackfleisch"),
                        ("Pide", 12.90, "Türkisches Fladenbrot mit Käse"),
                    ],
                ),
            ],
            ..venue(5, "Döner Sultan", (47.3763, 8.5485), "takeaway", "türkisch")
        },
        RestaurantRecord {
            description: "Gemütliches Café mit hausgemachten Kuchen".into(),
            rating: 4.3,
            phone: "+41 44 678 9012".into(),
            hours: "07:00 - 18:00".into(),
            delivery: false,
            menu: vec![
                category(
                    "Getränke",
                    &[
                        ("Espresso", 3.50, "Starker italienischer Kaffee"),
                        ("Cappuccino", 4.80, "Mit aufgeschäumter Milch"),
                        ("Chai Latte", 5.20, "Gewürztee mit Milch"),
                    ],
                ),
                category(
                    "Süßes",
                    &[
                        ("Cheesecake", 6.90, "Hausgemachter New York Cheesecake"),
                        ("Schokoladenkuchen", 5.50, "Saftiger Schokoladenkuchen"),
                    ],
                ),
                category(
                    "Snacks",
                    &[
                        ("Panini", 8.90, "Gegrilltes Sandwich mit Mozzarella und Tomaten"),
                        ("Bagel", 7.50, "Mit Lachs und Frischkäse"),
                    ],
                ),
            ],
            ..venue(6, "Café Central", (47.3667, 8.5444), "cafe", "international")
        },
    ]
}
