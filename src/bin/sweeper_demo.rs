use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sweeper::{
    Decision, DecisionMode, EmbeddingStore, ItemRef, LinearScanSelector, MemoryStore,
    ReviewEngine, SessionRegistry, Side, StaticOwnerDirectory, SweeperConfig,
};

const DEMO_OWNER: &str = "demo-user";
const DEMO_ITEMS: usize = 24;

/// Seeds one session with random embeddings and auto-plays it to the
/// terminal pair, always keeping the left item.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("sweeper=info".parse()?))
        .init();

    let config = SweeperConfig::from_env();
    let store = Arc::new(MemoryStore::new(config.embedding_dim));
    let owners = Arc::new(StaticOwnerDirectory::new());
    owners.register(DEMO_OWNER);

    let registry = SessionRegistry::new(
        owners.clone(),
        store.clone(),
        store.clone(),
        config.preview_limit,
    );
    let selector = Arc::new(LinearScanSelector::new(store.clone()));
    let engine = ReviewEngine::new(store.clone(), store.clone(), selector);

    let session = registry.create(DEMO_OWNER).await?;
    info!("Created session {}", session.token);

    let mut rng = StdRng::from_entropy();
    for i in 0..DEMO_ITEMS {
        let embedding: Vec<f32> = (0..config.embedding_dim).map(|_| rng.r#gen()).collect();
        store
            .insert(
                &session.token,
                &format!("photos/{i:04}.jpg"),
                &format!("photos/{i:04}.dng"),
                embedding,
            )
            .await?;
    }
    info!("Inserted {} items", DEMO_ITEMS);

    let mut pair = engine.seed(&session.token).await?;
    while !pair.is_terminal() {
        let (survivor, loser, side) = match (&pair.left, &pair.right) {
            (ItemRef::Item(left), other) => (left.clone(), other.clone(), Side::Left),
            (ItemRef::Terminal, ItemRef::Item(right)) => {
                (right.clone(), ItemRef::Terminal, Side::Right)
            }
            _ => break,
        };
        pair = engine
            .decide(
                &session.token,
                Decision {
                    survivor,
                    loser,
                    survivor_side: side,
                    mode: DecisionMode::DiscardLoser,
                },
            )
            .await?;
        info!(
            "progress: {:.1}%",
            registry.progress(&session.token).await?
        );
    }

    let kept = store.list_kept(&session.token).await?;
    let summary = registry.summary(&session.token).await?;
    info!("Session {} done, kept {:?}", summary.token, kept);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
