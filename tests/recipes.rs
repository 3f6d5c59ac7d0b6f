mod common;

use foodgram_sdk::{
    add_relation, count_relations, create_recipe, delete_recipe, find_tags_by_slug,
    get_recipe, get_recipe_detail, get_user, list_ingredients, list_recipe_ingredients,
    list_recipe_tags, list_subscriptions, list_tags, update_recipe,
    error::Error,
    schema::{RelationKind, Viewer},
};

#[tokio::test]
async fn update_replaces_tags_and_ingredients_wholesale() {
    let pool = common::store().await;
    let alice = common::user(&pool, "alice").await;
    let breakfast = common::tag(&pool, "breakfast").await;
    let dinner = common::tag(&pool, "dinner").await;
    let eggs = common::ingredient(&pool, "Eggs", "pcs").await;
    let milk = common::ingredient(&pool, "Milk", "ml").await;

    let recipe = create_recipe(
        alice,
        &common::form("Omelette", vec![breakfast], vec![(eggs, 3), (milk, 50)]),
        &pool,
    )
    .await
    .unwrap();

    let mut form = common::form("Late omelette", vec![dinner], vec![(eggs, 4)]);
    form.cooking_time = 30;
    update_recipe(recipe, &form, &pool).await.unwrap();

    let stored = get_recipe(recipe, &pool).await.unwrap().unwrap();
    assert_eq!(stored.name, "Late omelette");
    assert_eq!(stored.cooking_time, 30);

    let tags = list_recipe_tags(&pool, recipe).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, dinner);

    let lines = list_recipe_ingredients(&pool, recipe).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].ingredient_id, lines[0].amount), (eggs, 4));
}

#[tokio::test]
async fn failed_write_leaves_nothing_behind() {
    let pool = common::store().await;
    let alice = common::user(&pool, "alice").await;
    let tag = common::tag(&pool, "lunch").await;
    let eggs = common::ingredient(&pool, "Eggs", "pcs").await;

    let missing_ingredient = create_recipe(
        alice,
        &common::form("Ghost", vec![tag], vec![(eggs, 1), (999, 1)]),
        &pool,
    )
    .await;
    assert!(matches!(missing_ingredient, Err(Error::NotFoundEndpoint(_))));

    let unknown_author = create_recipe(
        999,
        &common::form("Orphan", vec![tag], vec![(eggs, 1)]),
        &pool,
    )
    .await;
    assert!(matches!(unknown_author, Err(Error::NotFoundEndpoint(_))));

    let invalid = create_recipe(alice, &common::form("Empty", vec![], vec![(eggs, 1)]), &pool).await;
    assert!(matches!(invalid, Err(Error::ValidationFailure(_))));

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);

    let recipe = create_recipe(alice, &common::form("Real", vec![tag], vec![(eggs, 2)]), &pool)
        .await
        .unwrap();
    let bad_update = update_recipe(
        recipe,
        &common::form("Real", vec![tag, 999], vec![(eggs, 5)]),
        &pool,
    )
    .await;
    assert!(matches!(bad_update, Err(Error::NotFoundEndpoint(_))));

    let lines = list_recipe_ingredients(&pool, recipe).await.unwrap();
    assert_eq!(lines[0].amount, 2);

    let missing = update_recipe(999, &common::form("None", vec![tag], vec![(eggs, 1)]), &pool).await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn detail_collects_everything_about_a_recipe() {
    let pool = common::store().await;
    let alice = common::user(&pool, "alice").await;
    let bob = common::user(&pool, "bob").await;
    let recipe = common::recipe(&pool, alice, "Soup").await;

    add_relation(RelationKind::Subscription, bob, alice, &pool).await.unwrap();
    add_relation(RelationKind::ShoppingCart, bob, recipe, &pool).await.unwrap();

    let detail = get_recipe_detail(recipe, Viewer::User(bob), &pool).await.unwrap();
    assert_eq!(detail.author.username, "alice");
    assert!(detail.is_subscribed);
    assert!(detail.annotation.is_in_shopping_cart);
    assert!(!detail.annotation.is_favorited);
    assert_eq!(detail.tags[0].slug, "tag-soup");
    assert_eq!(detail.ingredients[0].name, "Soup base");

    let anonymous = get_recipe_detail(recipe, Viewer::Anonymous, &pool).await.unwrap();
    assert!(!anonymous.is_subscribed);
    assert!(!anonymous.annotation.is_in_shopping_cart);

    assert!(matches!(
        get_recipe_detail(999, Viewer::Anonymous, &pool).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn delete_removes_recipe_and_its_relations() {
    let pool = common::store().await;
    let alice = common::user(&pool, "alice").await;
    let recipe = common::recipe(&pool, alice, "Soup").await;
    add_relation(RelationKind::Favorite, alice, recipe, &pool).await.unwrap();

    delete_recipe(recipe, &pool).await.unwrap();

    assert!(get_recipe(recipe, &pool).await.unwrap().is_none());
    assert_eq!(count_relations(RelationKind::Favorite, &pool).await.unwrap(), 0);
    assert!(matches!(delete_recipe(recipe, &pool).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn catalog_lookups() {
    let pool = common::store().await;
    let alice = common::user(&pool, "alice").await;
    common::tag(&pool, "dinner").await;
    common::tag(&pool, "breakfast").await;
    common::ingredient(&pool, "Salt", "g").await;
    common::ingredient(&pool, "Salt", "pinch").await;
    common::ingredient(&pool, "Sugar", "g").await;

    assert_eq!(get_user(&pool, "alice").await.unwrap().unwrap().id, alice);

    let tags: Vec<String> = list_tags(&pool).await.unwrap().into_iter().map(|t| t.slug).collect();
    assert_eq!(tags, vec!["breakfast", "dinner"]);
    let found = find_tags_by_slug(&[String::from("dinner"), String::from("lunch")], &pool)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let salts = list_ingredients("sal", &pool).await.unwrap();
    assert_eq!(salts.len(), 2);
    assert_eq!(salts[0].measurement_unit, "g");
    assert_eq!(list_ingredients("", &pool).await.unwrap().len(), 3);
    assert!(list_ingredients("%", &pool).await.unwrap().is_empty());

    let duplicate = foodgram_sdk::create_tag("Other", "dinner", &pool).await;
    assert!(matches!(duplicate, Err(Error::AlreadyExists(_))));
}

#[tokio::test]
async fn subscriptions_list_authors_with_recent_recipes() {
    let pool = common::store().await;
    let alice = common::user(&pool, "alice").await;
    let bob = common::user(&pool, "bob").await;
    let carol = common::user(&pool, "carol").await;
    common::recipe(&pool, bob, "Soup").await;
    let stew = common::recipe(&pool, bob, "Stew").await;
    common::recipe(&pool, carol, "Cake").await;
    let pie = common::recipe(&pool, bob, "Pie").await;

    add_relation(RelationKind::Subscription, alice, carol, &pool).await.unwrap();
    add_relation(RelationKind::Subscription, alice, bob, &pool).await.unwrap();

    let summaries = list_subscriptions(alice, Some(2), &pool).await.unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].author.id, bob);
    assert_eq!(summaries[0].recipes_count, 3);
    let bob_recipes: Vec<i32> = summaries[0].recipes.iter().map(|r| r.id).collect();
    assert_eq!(bob_recipes, vec![pie, stew]);
    assert_eq!(summaries[1].author.id, carol);
    assert_eq!(summaries[1].recipes.len(), 1);
    assert!(summaries.iter().all(|s| s.is_subscribed));

    let unlimited = list_subscriptions(alice, None, &pool).await.unwrap();
    assert_eq!(unlimited[0].recipes.len(), 3);
    assert!(list_subscriptions(bob, None, &pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn ingredient_prefix_search_folds_non_ascii_case() {
    let pool = common::store().await;
    common::ingredient(&pool, "Мука", "г").await;
    common::ingredient(&pool, "Молоко", "мл").await;
    common::ingredient(&pool, "Flour", "kg").await;

    let flour: Vec<String> = list_ingredients("мук", &pool)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(flour, vec!["Мука"]);

    assert_eq!(list_ingredients("МО", &pool).await.unwrap().len(), 1);
    assert_eq!(list_ingredients("м", &pool).await.unwrap().len(), 2);
    assert_eq!(list_ingredients("flo", &pool).await.unwrap().len(), 1);
}
