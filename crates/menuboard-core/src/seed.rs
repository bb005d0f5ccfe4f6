//! Starter catalog written by `MenuService::reset_to_initial_data`.

use crate::models::{NewCategory, NewItem, NewSubCategory, RowId};

pub fn category() -> NewCategory {
    NewCategory {
        name: "Drinks".to_string(),
        icon: Some("☕".to_string()),
    }
}

pub fn sub_category(category_id: RowId) -> NewSubCategory {
    NewSubCategory {
        name: "Hot drinks".to_string(),
        category_id,
    }
}

pub fn items(sub_category_id: RowId) -> Vec<NewItem> {
    vec![
        NewItem {
            name: "Cappuccino".to_string(),
            description: "Classic Italian coffee with milk foam".to_string(),
            price: 150.0,
            sub_category_id: sub_category_id.clone(),
            available: true,
            image: None,
        },
        NewItem {
            name: "Americano".to_string(),
            description: "Espresso topped up with hot water".to_string(),
            price: 130.0,
            sub_category_id,
            available: true,
            image: None,
        },
    ]
}
