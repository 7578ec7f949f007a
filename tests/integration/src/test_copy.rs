//! Copy integration tests.

#[cfg(test)]
mod tests {
    use ruststack_transfer_core::strategy::MIB;
    use ruststack_transfer_core::{CopyConfig, FailureStage, TransferPolicy, TransferStrategy};
    use ruststack_transfer_model::{ObjectLocation, ObjectOverrides, TransferRequest};

    use crate::{cleanup_bucket, create_test_bucket, object_exists, put_test_object, s3_client, transfer};

    fn request(src: &str, dst: &str, key: &str) -> TransferRequest {
        TransferRequest::new(ObjectLocation::new(src, key), ObjectLocation::new(dst, key))
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_small_object_in_one_call() {
        let client = s3_client();
        let src = create_test_bucket(&client, "copy-src").await;
        let dst = create_test_bucket(&client, "copy-dst").await;
        put_test_object(&client, &src, "hello.txt", b"hello world".to_vec()).await;

        let engine = transfer(&client);
        let outcome = engine
            .copy_object(&request(&src, &dst, "hello.txt"), &CopyConfig::default())
            .await;

        let success = outcome.success().expect("copy should succeed");
        assert_eq!(success.strategy, TransferStrategy::Single);
        assert_eq!(success.size, 11);
        assert!(object_exists(&client, &src, "hello.txt").await);

        let body = client
            .get_object()
            .bucket(&dst)
            .key("hello.txt")
            .send()
            .await
            .expect("get_object")
            .body
            .collect()
            .await
            .expect("read body")
            .into_bytes();
        assert_eq!(body.as_ref(), b"hello world");

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_with_multipart_when_preferred() {
        let client = s3_client();
        let src = create_test_bucket(&client, "mpc-src").await;
        let dst = create_test_bucket(&client, "mpc-dst").await;
        let size = usize::try_from(12 * MIB).expect("fits");
        let body: Vec<u8> = (0..size).map(|i| u8::try_from(i % 251).unwrap_or(0)).collect();
        put_test_object(&client, &src, "big.bin", body.clone()).await;

        let config = CopyConfig::builder()
            .part_size(5 * MIB)
            .policy(TransferPolicy::PreferMultipart)
            .build();
        let outcome = transfer(&client)
            .copy_object(&request(&src, &dst, "big.bin"), &config)
            .await;

        let success = outcome.success().expect("multipart copy should succeed");
        assert_eq!(success.strategy, TransferStrategy::Multipart { parts: 3 });

        let copied = client
            .get_object()
            .bucket(&dst)
            .key("big.bin")
            .send()
            .await
            .expect("get_object")
            .body
            .collect()
            .await
            .expect("read body")
            .into_bytes();
        assert_eq!(copied.len(), body.len());
        assert!(copied.as_ref() == body.as_slice());

        let uploads = client
            .list_multipart_uploads()
            .bucket(&dst)
            .send()
            .await
            .expect("list_multipart_uploads");
        assert!(uploads.uploads().is_empty());

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_apply_storage_class_override() {
        let client = s3_client();
        let src = create_test_bucket(&client, "sc-src").await;
        let dst = create_test_bucket(&client, "sc-dst").await;
        put_test_object(&client, &src, "cold.txt", b"archive me".to_vec()).await;

        let req = request(&src, &dst, "cold.txt").with_overrides(ObjectOverrides {
            storage_class: Some("STANDARD_IA".to_owned()),
            ..ObjectOverrides::default()
        });
        let outcome = transfer(&client).copy_object(&req, &CopyConfig::default()).await;
        assert!(outcome.is_success());

        let head = client
            .head_object()
            .bucket(&dst)
            .key("cold.txt")
            .send()
            .await
            .expect("head_object");
        assert_eq!(head.storage_class().map(|c| c.as_str()), Some("STANDARD_IA"));

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_missing_source_at_metadata_stage() {
        let client = s3_client();
        let src = create_test_bucket(&client, "missing-src").await;
        let dst = create_test_bucket(&client, "missing-dst").await;

        let outcome = transfer(&client)
            .copy_object(&request(&src, &dst, "absent.txt"), &CopyConfig::default())
            .await;
        let failure = outcome.failure_ref().expect("copy should fail");
        assert_eq!(failure.stage, FailureStage::Metadata);
        assert!(!object_exists(&client, &dst, "absent.txt").await);

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_batch_and_isolate_failures() {
        let client = s3_client();
        let src = create_test_bucket(&client, "batch-src").await;
        let dst = create_test_bucket(&client, "batch-dst").await;
        for i in 0..25 {
            put_test_object(&client, &src, &format!("obj-{i:02}"), vec![b'x'; 64]).await;
        }

        let mut requests: Vec<_> = (0..25)
            .map(|i| request(&src, &dst, &format!("obj-{i:02}")))
            .collect();
        requests.push(request(&src, &dst, "never-uploaded"));

        let config = CopyConfig::builder().group_size(10).build();
        let result = transfer(&client)
            .copy_objects(&requests, &config)
            .await
            .expect("batch should run");

        assert_eq!(result.success_count(), 25);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failures()[0].request.source.key, "never-uploaded");
        assert!(object_exists(&client, &dst, "obj-24").await);

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_build_requests_from_prefix_listing() {
        let client = s3_client();
        let src = create_test_bucket(&client, "prefix-src").await;
        let dst = create_test_bucket(&client, "prefix-dst").await;
        put_test_object(&client, &src, "logs/a.log", b"a".to_vec()).await;
        put_test_object(&client, &src, "logs/b.log", b"b".to_vec()).await;
        put_test_object(&client, &src, "other/c.log", b"c".to_vec()).await;

        let engine = transfer(&client);
        let requests = engine
            .requests_for_prefix(&src, "logs/", &dst, "archive/")
            .await
            .expect("listing should succeed");
        assert_eq!(requests.len(), 2);

        let result = engine
            .copy_objects(&requests, &CopyConfig::default())
            .await
            .expect("batch should run");
        assert!(result.is_complete_success());
        assert!(object_exists(&client, &dst, "archive/a.log").await);
        assert!(object_exists(&client, &dst, "archive/b.log").await);
        assert!(!object_exists(&client, &dst, "archive/c.log").await);

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }
}
