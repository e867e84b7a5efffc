mod common;

use qr_shortener::infrastructure::cache::NullCache;
use qr_shortener::infrastructure::persistence::MemoryUrlRepository;
use qr_shortener::utils::code_generator::RandomCodeGenerator;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_on_same_code() {
    let repo = Arc::new(MemoryUrlRepository::new());
    let service = common::create_service(
        repo.clone(),
        Arc::new(common::ScriptedCodeGenerator::new(&["same01", "same01"])),
        Arc::new(NullCache::new()),
    );

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.create("https://one.example.com", None, None).await })
    };
    let second = {
        let service = service.clone();
        tokio::spawn(async move { service.create("https://two.example.com", None, None).await })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_ne!(first.record.short_code, second.record.short_code);
    assert!(
        first.record.short_code.as_str() == "same01"
            || second.record.short_code.as_str() == "same01"
    );
    assert_eq!(repo.len(), 2);

    for created in [&first, &second] {
        let resolved = service
            .resolve(created.record.short_code.as_str())
            .await
            .unwrap();
        assert_eq!(resolved.original_url, created.record.original_url);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_creates_are_unique() {
    let repo = Arc::new(MemoryUrlRepository::new());
    let service = common::create_service(
        repo.clone(),
        Arc::new(RandomCodeGenerator::default()),
        Arc::new(NullCache::new()),
    );

    let handles: Vec<_> = (0..64)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create(&format!("https://example.com/{}", i), None, None)
                    .await
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        let created = handle.await.unwrap().unwrap();
        codes.insert(created.record.short_code.into_inner());
    }

    assert_eq!(codes.len(), 64);
    assert_eq!(repo.len(), 64);
}
