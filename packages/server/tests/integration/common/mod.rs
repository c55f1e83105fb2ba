use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use common::{Bucket, FilesystemObjectStore, ObjectId, ObjectStore};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use server::config::{
    AccountConfig, AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig,
};
use server::state::AppState;
use server::utils::hash;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin@123";
pub const USER_USERNAME: &str = "meera";
pub const USER_PASSWORD: &str = "family@123";

/// Hashing is slow by design, so the account list is built once per binary.
static TEST_ACCOUNTS: OnceLock<Vec<AccountConfig>> = OnceLock::new();

pub mod routes {
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const DOCUMENTS: &str = "/api/v1/documents";
    pub const ADMIN_DOCUMENTS: &str = "/api/v1/admin/documents";
    pub const ADMIN_MEMBER_IMAGES: &str = "/api/v1/admin/member-images";

    pub fn document_view(id: i32) -> String {
        format!("/api/v1/documents/{id}/view")
    }

    pub fn document_download(id: i32) -> String {
        format!("/api/v1/documents/{id}/download")
    }

    pub fn admin_document(id: i32) -> String {
        format!("/api/v1/admin/documents/{id}")
    }

    pub fn member_image(member_name: &str) -> String {
        format!("/api/v1/members/{member_name}/image")
    }
}

/// A running test server backed by a throwaway SQLite file and object
/// store directory, both inside a per-test temp dir.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub objects: Arc<dyn ObjectStore>,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

/// Raw HTTP response for streaming endpoints.
pub struct BinaryResponse {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let db_path = dir.path().join("famvault.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");
        server::seed::ensure_indexes(&db)
            .await
            .expect("Failed to create indexes");

        let max_object_size = 10 * 1024 * 1024;
        let objects: Arc<dyn ObjectStore> = Arc::new(
            FilesystemObjectStore::new(dir.path().join("objects"), max_object_size)
                .await
                .expect("Failed to create object store"),
        );

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url.clone(),
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-for-integration-tests".to_string(),
                token_ttl_hours: 24,
                accounts: test_accounts(),
            },
            storage: StorageConfig {
                root: dir.path().join("objects").display().to_string(),
                max_object_size,
            },
        };

        let state = AppState {
            db: db.clone(),
            objects: objects.clone(),
            config: Arc::new(app_config),
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            objects,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_params(
        &self,
        path: &str,
        params: &[(&str, &str)],
        token: &str,
    ) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .query(params)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// GET a streaming endpoint, keeping headers and raw bytes.
    pub async fn get_binary_with_token(&self, path: &str, token: &str) -> BinaryResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        BinaryResponse::from_response(res).await
    }

    /// GET a streaming endpoint without authentication.
    pub async fn get_binary_without_token(&self, path: &str) -> BinaryResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        BinaryResponse::from_response(res).await
    }

    /// POST a document upload as multipart form data.
    pub async fn upload_document(
        &self,
        token: &str,
        title: &str,
        member_name: &str,
        category: &str,
        file_name: &str,
        file_bytes: Vec<u8>,
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("title", title.to_string())
            .text("member_name", member_name.to_string())
            .text("category", category.to_string())
            .part("file", part);

        let res = self
            .client
            .post(self.url(routes::ADMIN_DOCUMENTS))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// POST a member image upload as multipart form data.
    pub async fn upload_member_image(
        &self,
        token: &str,
        member_name: &str,
        file_name: &str,
        file_bytes: Vec<u8>,
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("member_name", member_name.to_string())
            .part("file", part);

        let res = self
            .client
            .post(self.url(routes::ADMIN_MEMBER_IMAGES))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Log in with the given credentials and return the raw response.
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.post_without_token(
            routes::LOGIN,
            &serde_json::json!({"username": username, "password": password}),
        )
        .await
    }

    /// Log in as the configured admin account and return the auth token.
    pub async fn admin_token(&self) -> String {
        let res = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(res.status, 200, "Admin login failed: {}", res.text);
        res.token()
    }

    /// Log in as the configured non-admin account and return the auth token.
    pub async fn user_token(&self) -> String {
        let res = self.login(USER_USERNAME, USER_PASSWORD).await;
        assert_eq!(res.status, 200, "User login failed: {}", res.text);
        res.token()
    }

    /// Upload a document with the given metadata and return its `id`.
    pub async fn create_document(
        &self,
        token: &str,
        title: &str,
        member_name: &str,
        category: &str,
    ) -> i32 {
        let res = self
            .upload_document(
                token,
                title,
                member_name,
                category,
                "upload.pdf",
                b"test document payload".to_vec(),
            )
            .await;
        assert_eq!(res.status, 201, "create_document failed: {}", res.text);
        res.id()
    }

    /// Delete a document's stored object directly, leaving its catalog row behind.
    pub async fn remove_stored_object(&self, file_reference: &str) {
        let id = ObjectId::parse(file_reference).expect("Invalid file_reference");
        let deleted = self
            .objects
            .delete(Bucket::Documents, &id)
            .await
            .expect("Failed to delete stored object");
        assert!(deleted, "Object {file_reference} was already gone");
    }
}

fn test_accounts() -> Vec<AccountConfig> {
    TEST_ACCOUNTS
        .get_or_init(|| {
            vec![
                test_account(ADMIN_USERNAME, ADMIN_PASSWORD, "admin"),
                test_account(USER_USERNAME, USER_PASSWORD, "user"),
            ]
        })
        .clone()
}

fn test_account(username: &str, password: &str, role: &str) -> AccountConfig {
    AccountConfig {
        username: username.to_string(),
        password_hash: hash::hash_password(password).expect("Failed to hash test password"),
        role: role.to_string(),
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }

    pub fn token(&self) -> String {
        self.body["token"]
            .as_str()
            .expect("response body should contain 'token'")
            .to_string()
    }

    /// Titles of the documents in a list response, in order.
    pub fn document_titles(&self) -> Vec<String> {
        self.body["documents"]
            .as_array()
            .expect("response body should contain 'documents'")
            .iter()
            .map(|d| d["title"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl BinaryResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let bytes = res.bytes().await.expect("Failed to read body").to_vec();
        Self {
            status,
            headers,
            bytes,
        }
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}
