mod common;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stationery_client::models::inventory::{ItemDraft, StockStatus};
use stationery_client::{ClientError, InventoryScope, InventoryViewModel};

fn draft(name: &str, category: &str, quantity: u32, threshold: u32) -> ItemDraft {
    ItemDraft {
        name: name.to_string(),
        category: category.to_string(),
        quantity,
        low_stock_threshold: threshold,
    }
}

#[tokio::test]
async fn refresh_flattens_categories_and_recomputes_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/inventory/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            // status lies on the wire; quantity/threshold decide
            {"id": 1, "name": "Pencils", "category": {"id": 10, "name": "Writing"},
             "quantity": 0, "low_stock_threshold": 5, "status": "in_stock"},
            {"id": 2, "name": "Glue", "category": {"id": 11, "name": "Craft"},
             "quantity": 3, "low_stock_threshold": 5},
            {"id": 3, "name": "Paper", "category": {"id": 12, "name": "Writing"},
             "quantity": 200, "low_stock_threshold": 20},
        ])))
        .mount(&server)
        .await;

    let mut view = InventoryViewModel::new(common::session_client(&server), InventoryScope::Shared);
    view.refresh().await.unwrap();

    let items = view.items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].status, StockStatus::OutOfStock);
    assert_eq!(items[0].category, "Writing");
    assert_eq!(items[1].status, StockStatus::LowStock);
    assert_eq!(items[2].status, StockStatus::InStock);
}

#[tokio::test]
async fn search_filters_by_name_and_category_and_resets_the_page() {
    let server = MockServer::start().await;
    let items: Vec<_> = (1..=20)
        .map(|i| {
            let (name, category) = if i % 2 == 0 {
                (format!("Marker {i}"), "Writing")
            } else {
                (format!("Scissors {i}"), "Craft")
            };
            common::inventory_item(i, &name, category, 50, 5)
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/inventory/inventory/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(&server)
        .await;

    let mut view = InventoryViewModel::new(common::session_client(&server), InventoryScope::Shared);
    view.refresh().await.unwrap();

    // 20 items, 7 per page
    assert_eq!(view.page_count(), 3);
    view.next_page();
    assert_eq!(view.page(), 2);

    view.set_search("craft");
    assert_eq!(view.page(), 1, "search resets pagination");
    assert!(view.filtered().iter().all(|i| i.category == "Craft"));

    view.set_search("MARKER 2");
    let names: Vec<_> = view.filtered().iter().map(|i| i.name.clone()).collect();
    assert_eq!(names, vec!["Marker 2", "Marker 20"]);
}

#[tokio::test]
async fn visible_page_is_clamped_to_the_configured_size() {
    let server = MockServer::start().await;
    let items: Vec<_> = (1..=9)
        .map(|i| common::inventory_item(i, &format!("Item {i}"), "Misc", 10, 2))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/inventory/inventory/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(&server)
        .await;

    let mut view = InventoryViewModel::new(common::session_client(&server), InventoryScope::Shared);
    view.refresh().await.unwrap();

    assert_eq!(view.visible().len(), 7);
    view.next_page();
    assert_eq!(view.visible().len(), 2);
    view.next_page();
    assert_eq!(view.page(), 2, "past the last page is a no-op");
}

#[tokio::test]
async fn saving_with_a_known_category_posts_the_resolved_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "Writing", "is_custom": false}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/inventory/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/inventory/inventory/"))
        .and(body_json(json!({
            "name": "Pencils",
            "category_id": 10,
            "quantity": 30,
            "low_stock_threshold": 5
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = InventoryViewModel::new(common::session_client(&server), InventoryScope::Shared);
    view.load().await.unwrap();
    view.save(&draft("Pencils", "Writing", 30, 5), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn an_unknown_category_is_created_before_the_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/inventory/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/inventory/categories/"))
        .and(body_json(json!({"name": "Lab Supplies"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42, "name": "Lab Supplies", "is_custom": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/inventory/inventory/"))
        .and(body_json(json!({
            "name": "Beakers",
            "category_id": 42,
            "quantity": 12,
            "low_stock_threshold": 3
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = InventoryViewModel::new(common::session_client(&server), InventoryScope::Shared);
    view.load().await.unwrap();
    view.save(&draft("Beakers", "Lab Supplies", 12, 3), None)
        .await
        .unwrap();

    // Creating a second item in the same category reuses the id.
    Mock::given(method("POST"))
        .and(path("/api/inventory/inventory/"))
        .and(body_json(json!({
            "name": "Flasks",
            "category_id": 42,
            "quantity": 6,
            "low_stock_threshold": 2
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 8})))
        .expect(1)
        .mount(&server)
        .await;
    view.save(&draft("Flasks", "Lab Supplies", 6, 2), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn edits_go_out_as_put_against_the_item_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "Writing"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/inventory/"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([common::inventory_item(5, "Pens", "Writing", 9, 5)])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/inventory/inventory/5/"))
        .and(body_json(json!({
            "name": "Pens",
            "category_id": 10,
            "quantity": 40,
            "low_stock_threshold": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = InventoryViewModel::new(common::session_client(&server), InventoryScope::Shared);
    view.load().await.unwrap();
    view.save(&draft("Pens", "Writing", 40, 5), Some(5))
        .await
        .unwrap();
}

#[tokio::test]
async fn a_failed_save_leaves_the_list_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "Writing"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/inventory/"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([common::inventory_item(1, "Pencils", "Writing", 20, 5)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/inventory/inventory/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"name": ["already exists"]})),
        )
        .mount(&server)
        .await;

    let mut view = InventoryViewModel::new(common::session_client(&server), InventoryScope::Shared);
    view.load().await.unwrap();

    let err = view
        .save(&draft("Pencils", "Writing", 10, 5), None)
        .await
        .unwrap_err();
    assert_matches!(err, ClientError::Api { message, .. } if message.contains("already exists"));
    assert_eq!(view.items().len(), 1, "list unchanged after a failed save");
}

#[tokio::test]
async fn delete_refetches_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/inventory/"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([common::inventory_item(1, "Pencils", "Writing", 20, 5)])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/inventory/inventory/1/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = InventoryViewModel::new(common::session_client(&server), InventoryScope::Shared);
    view.refresh().await.unwrap();
    view.delete(1).await.unwrap();
}

#[tokio::test]
async fn teacher_scope_uses_the_teacher_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/teacher/inventory/"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([common::inventory_item(3, "Chalk", "Classroom", 15, 4)])))
        .expect(1)
        .mount(&server)
        .await;

    let mut view =
        InventoryViewModel::new(common::session_client(&server), InventoryScope::Teacher);
    view.refresh().await.unwrap();
    assert_eq!(view.items()[0].name, "Chalk");
}
