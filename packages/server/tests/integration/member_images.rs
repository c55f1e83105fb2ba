use common::{Bucket, ObjectId};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use server::entity::member_image;

use crate::common::{TestApp, routes};

mod uploads {
    use super::*;

    #[tokio::test]
    async fn admin_can_upload_a_member_image() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .upload_member_image(&admin, "Rahima", "rahima.jpg", b"jpeg bytes".to_vec())
            .await;

        assert_eq!(res.status, 201, "Upload failed: {}", res.text);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["member_name"], "Rahima");
        assert_eq!(res.body["file_name"], "rahima.jpg");
        assert_eq!(res.body["uploaded_by"], "admin");
        assert!(res.body["image_id"].is_string());
    }

    #[tokio::test]
    async fn uploading_again_replaces_the_previous_image() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let first = app
            .upload_member_image(&admin, "Rahima", "old.jpg", b"old image".to_vec())
            .await;
        assert_eq!(first.status, 201, "First upload failed: {}", first.text);
        let old_image_id = first.body["image_id"].as_str().unwrap().to_string();

        let second = app
            .upload_member_image(&admin, "Rahima", "new.jpg", b"new image".to_vec())
            .await;
        assert_eq!(second.status, 201, "Second upload failed: {}", second.text);
        assert_ne!(second.body["image_id"].as_str().unwrap(), old_image_id);

        // Exactly one catalog record per member.
        let records = member_image::Entity::find()
            .filter(member_image::Column::MemberName.eq("Rahima"))
            .all(&app.db)
            .await
            .expect("DB query failed");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "new.jpg");

        // The old object is gone from the store.
        let old_id = ObjectId::parse(&old_image_id).unwrap();
        assert!(
            !app.objects
                .exists(Bucket::MemberImages, &old_id)
                .await
                .unwrap()
        );

        // Serving the image yields the latest bytes.
        let res = app
            .get_binary_without_token(&routes::member_image("Rahima"))
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, b"new image");
    }

    #[tokio::test]
    async fn upload_requires_admin_role() {
        let app = TestApp::spawn().await;
        let user = app.user_token().await;

        let res = app
            .upload_member_image(&user, "Rahima", "rahima.jpg", b"jpeg bytes".to_vec())
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn upload_with_empty_member_name_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .upload_member_image(&admin, "   ", "rahima.jpg", b"jpeg bytes".to_vec())
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION");
    }
}

mod serving {
    use super::*;

    #[tokio::test]
    async fn member_image_is_served_without_authentication() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let payload = b"public avatar".to_vec();

        let res = app
            .upload_member_image(&admin, "Irfan", "irfan.png", payload.clone())
            .await;
        assert_eq!(res.status, 201, "Upload failed: {}", res.text);

        let res = app
            .get_binary_without_token(&routes::member_image("Irfan"))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.header("content-type"), "image/png");
        assert!(res.header("content-disposition").starts_with("inline;"));
        assert_eq!(res.bytes, payload);
    }

    #[tokio::test]
    async fn unknown_member_returns_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::member_image("Nobody")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
