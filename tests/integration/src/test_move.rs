//! Move integration tests.

#[cfg(test)]
mod tests {
    use ruststack_transfer_core::{CopyConfig, MoveConfig};
    use ruststack_transfer_model::{ObjectLocation, TransferRequest};

    use crate::{cleanup_bucket, create_test_bucket, object_exists, put_test_object, s3_client, transfer};

    fn request(src: &str, dst: &str, key: &str) -> TransferRequest {
        TransferRequest::new(ObjectLocation::new(src, key), ObjectLocation::new(dst, key))
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_move_object_and_delete_source() {
        let client = s3_client();
        let src = create_test_bucket(&client, "mv-src").await;
        let dst = create_test_bucket(&client, "mv-dst").await;
        put_test_object(&client, &src, "moving.txt", b"payload".to_vec()).await;

        let outcome = transfer(&client)
            .move_object(&request(&src, &dst, "moving.txt"), &CopyConfig::default())
            .await;

        assert!(outcome.is_success());
        assert!(!object_exists(&client, &src, "moving.txt").await);
        assert!(object_exists(&client, &dst, "moving.txt").await);

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_refuse_to_move_object_onto_itself() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "mv-self").await;
        put_test_object(&client, &bucket, "stay.txt", b"keep".to_vec()).await;

        let outcome = transfer(&client)
            .move_object(&request(&bucket, &bucket, "stay.txt"), &CopyConfig::default())
            .await;

        assert!(!outcome.is_success());
        assert!(object_exists(&client, &bucket, "stay.txt").await);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_move_batch_with_bulk_delete() {
        let client = s3_client();
        let src = create_test_bucket(&client, "bulk-src").await;
        let dst = create_test_bucket(&client, "bulk-dst").await;
        for i in 0..30 {
            put_test_object(&client, &src, &format!("item-{i:02}"), vec![b'y'; 32]).await;
        }

        let requests: Vec<_> = (0..30)
            .map(|i| request(&src, &dst, &format!("item-{i:02}")))
            .collect();
        let config = MoveConfig::builder().batched_delete(true).build();
        let result = transfer(&client)
            .move_objects(&requests, &config)
            .await
            .expect("batch should run");

        assert!(result.is_complete_success());
        assert_eq!(result.success_count(), 30);

        let remaining = client
            .list_objects_v2()
            .bucket(&src)
            .send()
            .await
            .expect("list_objects_v2");
        assert!(remaining.contents().is_empty());
        assert!(object_exists(&client, &dst, "item-29").await);

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_keep_source_when_copy_fails_during_move() {
        let client = s3_client();
        let src = create_test_bucket(&client, "mvfail-src").await;
        let dst = create_test_bucket(&client, "mvfail-dst").await;
        put_test_object(&client, &src, "ok.txt", b"ok".to_vec()).await;

        let requests = vec![
            request(&src, &dst, "ok.txt"),
            TransferRequest::new(
                ObjectLocation::new(&src, "missing.txt"),
                ObjectLocation::new(format!("{dst}-does-not-exist"), "missing.txt"),
            ),
        ];
        let result = transfer(&client)
            .move_objects(&requests, &MoveConfig::default())
            .await
            .expect("batch should run");

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.failure_count(), 1);
        assert!(!object_exists(&client, &src, "ok.txt").await);

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }
}
