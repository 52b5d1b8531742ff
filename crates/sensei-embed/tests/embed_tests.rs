use sensei_core::config::{EmbeddingSettings, ProviderKind};
use sensei_core::error::Error;
use sensei_core::traits::EmbedProvider;
use sensei_embed::{build_provider, LocalEmbedder, RemoteEmbedder};

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[tokio::test]
async fn hash_embedder_shapes_order_and_determinism() {
    let settings = EmbeddingSettings { provider: ProviderKind::Hash, hash_dim: 384, ..Default::default() };
    let embedder = build_provider(&settings).expect("embedder");
    assert_eq!(embedder.dim(), 384);
    assert_eq!(embedder.embedder_id(), "hash:xxh64:d384");

    let texts = vec![
        "binary search tree".to_string(),
        "dynamic programming table".to_string(),
        "binary search tree".to_string(),
    ];
    let embs = embedder.embed_batch(&texts).await.expect("embed_batch");
    assert_eq!(embs.len(), 3);
    for v in &embs {
        assert_eq!(v.len(), 384);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    }
    for (a, b) in embs[0].iter().zip(embs[2].iter()) { assert!((a - b).abs() <= 1e-6); }
    assert!(cosine(&embs[0], &embs[2]) > cosine(&embs[0], &embs[1]));
}

#[tokio::test]
async fn empty_batch_is_empty_for_every_provider() {
    let hash = build_provider(&EmbeddingSettings { provider: ProviderKind::Hash, ..Default::default() }).expect("hash");
    assert!(hash.embed_batch(&[]).await.expect("hash").is_empty());
    let local = LocalEmbedder::new(&EmbeddingSettings::default());
    assert!(local.embed_batch(&[]).await.expect("local").is_empty());
    assert!(!local.is_loaded(), "empty batch must not load the model");
}

#[tokio::test]
async fn local_provider_reports_dim_without_loading_and_fails_on_missing_model() {
    let tmp = tempfile::tempdir().expect("tmp");
    let settings = EmbeddingSettings {
        provider: ProviderKind::Local,
        local_model_dir: Some(tmp.path().to_string_lossy().to_string()),
        ..Default::default()
    };
    let local = LocalEmbedder::new(&settings);
    assert_eq!(local.dim(), 384);
    assert_eq!(local.embedder_id(), "local:sentence-transformers/all-MiniLM-L6-v2:d384");
    let err = local.embed_batch(&["arrays".to_string()]).await.expect_err("no weights on disk");
    assert!(err.to_string().contains("tokenizer"), "unexpected error: {err}");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
    assert!(!local.is_loaded());
}

#[tokio::test]
async fn remote_provider_without_key_fails_per_call() {
    let settings = EmbeddingSettings { api_base: "http://127.0.0.1:9".to_string(), ..Default::default() };
    let remote = RemoteEmbedder::with_key(&settings, None).expect("construct without key");
    assert_eq!(remote.dim(), 1536);
    assert!(remote.embed_batch(&["hash maps".to_string()]).await.is_err());
}

#[tokio::test]
async fn remote_provider_unreachable_endpoint_is_an_error() {
    let settings = EmbeddingSettings { api_base: "http://127.0.0.1:9".to_string(), timeout_secs: 2, ..Default::default() };
    let remote = RemoteEmbedder::with_key(&settings, Some("sk-test".to_string())).expect("construct");
    assert!(remote.embed_batch(&["graphs".to_string()]).await.is_err());
}
