use async_trait::async_trait;

/// Read side used by list screens: every record of `T`, unfiltered.
#[async_trait]
pub trait DataSource<T>: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<T>>;
}
