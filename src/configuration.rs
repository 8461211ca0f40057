#[derive(Clone)]
pub struct Configuration {
    pub data_dir: String,
    pub api_listen: std::net::SocketAddr,
    pub admin_secret: Option<String>,
    pub page_size: usize,
    pub log_file: Option<String>,
    pub reset: bool,
}
