use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn file_size(&self, path: &str) -> impl std::future::Future<Output = Result<u64>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> &str;
    fn output_path(&self) -> &str;
    fn max_retries(&self) -> u32;
    fn backoff_base_ms(&self) -> u64;
    fn request_timeout_secs(&self) -> Option<u64>;
}
