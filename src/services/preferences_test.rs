use super::*;
use crate::models::NewSchool;
use crate::state::test_helpers::MemoryStore;

#[test]
fn normalize_keeps_order() {
    assert_eq!(normalize_country_ids(&[7, 3, 12]), vec![7, 3, 12]);
}

#[test]
fn normalize_drops_repeats_keeping_first() {
    assert_eq!(normalize_country_ids(&[4, 9, 4, 2, 9]), vec![4, 9, 2]);
}

#[test]
fn normalize_drops_non_positive_ids() {
    assert_eq!(normalize_country_ids(&[0, 5, -1, 6]), vec![5, 6]);
    assert!(normalize_country_ids(&[]).is_empty());
}

async fn school_id(store: &MemoryStore) -> SchoolId {
    let new_user = crate::models::NewUser {
        username: "advisor".into(),
        password_hash: "x".into(),
        first_name: String::new(),
        last_name: String::new(),
        email: String::new(),
        user_type: crate::models::UserType::Advisor,
    };
    let school = NewSchool { name: "Lincoln High".into(), ..NewSchool::default() };
    let (_, school) = store.create_user(new_user, Some(school)).await.unwrap();
    school.unwrap().id
}

#[tokio::test]
async fn link_stores_ranked_list() {
    let store = MemoryStore::new();
    let school_id = school_id(&store).await;

    let linked = link_country_preferences(&store, school_id, &[3, 1, 2]).await.unwrap();

    assert_eq!(linked, vec![3, 1, 2]);
    assert_eq!(store.country_preferences(school_id).await.unwrap(), vec![3, 1, 2]);
}

#[tokio::test]
async fn link_replaces_previous_list() {
    let store = MemoryStore::new();
    let school_id = school_id(&store).await;

    link_country_preferences(&store, school_id, &[1, 2]).await.unwrap();
    link_country_preferences(&store, school_id, &[5]).await.unwrap();

    assert_eq!(store.country_preferences(school_id).await.unwrap(), vec![5]);
}

#[tokio::test]
async fn link_empty_list_clears_preferences() {
    let store = MemoryStore::new();
    let school_id = school_id(&store).await;
    link_country_preferences(&store, school_id, &[1, 2]).await.unwrap();

    let linked = link_country_preferences(&store, school_id, &[]).await.unwrap();

    assert!(linked.is_empty());
    assert!(store.country_preferences(school_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn link_surfaces_store_failure() {
    let store = MemoryStore::new();
    let school_id = school_id(&store).await;
    store
        .fail_preferences
        .store(true, std::sync::atomic::Ordering::SeqCst);

    assert!(link_country_preferences(&store, school_id, &[1]).await.is_err());
}
