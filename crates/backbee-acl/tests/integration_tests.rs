//! End-to-end access control over the SQLite store.
//!
//! Exercises the manager and the hierarchical voter against the same
//! persisted ACLs.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use backbee_acl::{
    AclManager, AclVoter, BasicPermissionMap, ContentTypeRegistry, HierarchicalVoter, MaskSpec,
    MutableAclProvider, ObjectIdentity, SecuredObject, SecurityIdentity, SqlAclProvider, Token,
    TreeNode, Vote,
};

struct Fixture {
    manager: AclManager,
    voter: HierarchicalVoter,
    types: Arc<ContentTypeRegistry>,
}

async fn fixture() -> Fixture {
    let provider: Arc<dyn MutableAclProvider> =
        Arc::new(SqlAclProvider::connect("sqlite::memory:").await.unwrap());
    let types = Arc::new(
        ContentTypeRegistry::default()
            .with_type("Block", None, Some("basic"))
            .with_type("Article", Some("Block"), Some("news")),
    );
    let manager = AclManager::new(Arc::clone(&provider)).with_types(Arc::clone(&types));
    let voter = HierarchicalVoter::new(
        AclVoter::new(provider, Arc::new(BasicPermissionMap::new())),
        Arc::clone(&types),
    );
    Fixture {
        manager,
        voter,
        types,
    }
}

fn page(id: &str) -> ObjectIdentity {
    ObjectIdentity::new(id, "Page").unwrap()
}

fn alice() -> SecurityIdentity {
    SecurityIdentity::user("User", "alice")
}

#[tokio::test]
async fn test_page_tree_permissions_and_votes() {
    let fx = fixture().await;
    let tree = TreeNode::new(page("news"), vec![page("home")]);

    fx.manager
        .insert_or_update_object_ace(&page("home"), &alice(), vec!["view", "edit", "publish"], None)
        .await
        .unwrap();

    let permissions = fx.manager.get_permissions_by_page(&tree, &alice()).await.unwrap();
    assert_eq!(permissions.get("publish"), Some(&1));
    assert_eq!(permissions.get("delete"), Some(&0));

    let token = Token::new(alice());
    let object = SecuredObject::Page(tree);
    assert_eq!(fx.voter.vote(&token, &object, &["publish"]).await.unwrap(), Vote::Granted);
    assert_eq!(fx.voter.vote(&token, &object, &["delete"]).await.unwrap(), Vote::Denied);
}

#[tokio::test]
async fn test_masks_from_json() {
    let fx = fixture().await;
    let value = serde_json::json!(["view", 8]);
    let mask = MaskSpec::try_from(&value).unwrap();

    fx.manager
        .insert_or_update_class_ace(&page("any"), &alice(), mask, None)
        .await
        .unwrap();

    let ace = fx.manager.get_class_ace(&page("other"), &alice()).await.unwrap();
    assert_eq!(ace.mask, 9);
}

#[tokio::test]
async fn test_content_inherits_from_parent_type() {
    let fx = fixture().await;
    let role = SecurityIdentity::role("ROLE_WRITER");
    fx.manager
        .insert_or_update_class_ace(&ObjectIdentity::class_scope("Block").unwrap(), &role, "edit", None)
        .await
        .unwrap();

    let article = ObjectIdentity::new("a1", "Article").unwrap();
    let permissions = fx.manager.get_permissions(&article, &role).await.unwrap();
    assert_eq!(permissions.get("edit"), Some(&1));
    assert_eq!(permissions.get("view"), Some(&1));

    let token = Token::anonymous().with_role("ROLE_WRITER");
    let content = SecuredObject::content(article, &fx.types);
    assert_eq!(fx.voter.vote(&token, &content, &["edit"]).await.unwrap(), Vote::Granted);
}

#[tokio::test]
async fn test_deleted_ace_no_longer_grants() {
    let fx = fixture().await;
    fx.manager
        .insert_or_update_object_ace(&page("p1"), &alice(), "view", None)
        .await
        .unwrap();
    fx.manager.delete_object_ace(&page("p1"), &alice()).await.unwrap();

    let token = Token::new(alice());
    let object = SecuredObject::Object(page("p1"));
    assert_eq!(fx.voter.vote(&token, &object, &["view"]).await.unwrap(), Vote::Denied);
    assert!(fx.manager.get_permissions(&page("p1"), &alice()).await.unwrap().is_empty());
}
