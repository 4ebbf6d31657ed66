//! Shared fixtures for in-crate tests

use std::sync::Arc;

use jsonwebtoken::{encode, jwk::JwkSet, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use crate::{
    auth::JwksVerifier,
    config::{AppConfig, AuthConfig},
    models::{Book, CreateBook, UpdateBook},
    repository::{BookStore, StoreError, StoreResult},
    AppState,
};

pub const ISSUER: &str = "https://issuer.test/";
pub const AUDIENCE: &str = "https://api.libros.test";
pub const KEY_ID: &str = "test-key";

const PRIVATE_KEY: &[u8] = include_bytes!("../tests/fixtures/test_rsa_key.pem");

/// Public half of the fixture key, base64url encoded
const MODULUS: &str = "29YrQjV4IaOtGiuiJA7ma4dsiPAyAWPPfiKQElaEm2_hRSYgTXmy1R487uaPGTujpwNGw3AVZEh7-FhABvbfyPrWeTUs1PJGMLi8wUGWklHDU4IvMIAIWYIeYnyp8UVtVKDoY61LGLSvzNq5a1Ph5uuBtNBLg3CpkXjxfhL03BMixFC1lKDs-oJLPhE8IXsaOXVdShTVprcreJgOWkgYFGGLXgRokAmniBYqpC1vziiQB3WVeg0Q85r6wj0GXggKtuyTYQcBZGY_wtc52VNyrhRBQkx4QIauRMgG1hVhzXCLt3907CS4oCbasvgwCfgE_lM3CkI8docmeRHe2YmSJQ";

pub fn jwks_json() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "kid": KEY_ID,
            "use": "sig",
            "alg": "RS256",
            "n": MODULUS,
            "e": "AQAB",
        }]
    })
}

pub fn verifier() -> JwksVerifier {
    let jwks: JwkSet = serde_json::from_value(jwks_json()).unwrap();
    JwksVerifier::with_keys(ISSUER, AUDIENCE, jwks)
}

pub fn claims() -> Value {
    json!({
        "sub": "auth0|tester",
        "aud": AUDIENCE,
        "iss": ISSUER,
        "exp": jsonwebtoken::get_current_timestamp() + 600,
        "scope": "read:libros write:libros",
    })
}

pub fn token_signed(kid: Option<&str>, claims: Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY).unwrap();
    encode(&header, &claims, &key).unwrap()
}

/// Valid token with some claims replaced
pub fn token_with(overrides: Value) -> String {
    let mut claims = claims();
    if let (Some(base), Some(extra)) = (claims.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    token_signed(Some(KEY_ID), claims)
}

pub fn token() -> String {
    token_signed(Some(KEY_ID), claims())
}

pub fn config() -> AppConfig {
    AppConfig {
        server: Default::default(),
        database: Default::default(),
        auth: AuthConfig {
            issuer_base_url: ISSUER.to_string(),
            audience: AUDIENCE.to_string(),
            timeout_secs: 10,
        },
        api: Default::default(),
        logging: Default::default(),
    }
}

pub fn state(books: impl BookStore + 'static) -> AppState {
    AppState {
        config: Arc::new(config()),
        books: Arc::new(books),
        verifier: Arc::new(verifier()),
    }
}

/// Book store kept in memory, for tests that need state across requests
#[derive(Default)]
pub struct MemoryStore {
    books: std::sync::Mutex<Vec<Book>>,
}

impl MemoryStore {
    fn position(books: &[Book], id: &str) -> StoreResult<Option<usize>> {
        let id = uuid::Uuid::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))?;
        Ok(books.iter().position(|b| b.id == id))
    }
}

#[async_trait::async_trait]
impl BookStore for MemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.books.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let books = self.books.lock().unwrap();
        Ok(Self::position(&books, id)?.map(|i| books[i].clone()))
    }

    async fn create(&self, data: &CreateBook) -> StoreResult<Book> {
        let now = chrono::Utc::now();
        let book = Book {
            id: uuid::Uuid::new_v4(),
            title: data.title.clone(),
            author: data.author.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.books.lock().unwrap().push(book.clone());
        Ok(book)
    }

    async fn update_by_id(&self, id: &str, data: &UpdateBook) -> StoreResult<Option<Book>> {
        let mut books = self.books.lock().unwrap();
        let Some(i) = Self::position(&books, id)? else {
            return Ok(None);
        };
        let book = &mut books[i];
        if let Some(title) = &data.title {
            book.title = title.clone();
        }
        if let Some(author) = &data.author {
            book.author = author.clone();
        }
        book.updated_at = Some(chrono::Utc::now());
        Ok(Some(book.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let mut books = self.books.lock().unwrap();
        Ok(Self::position(&books, id)?.map(|i| books.remove(i)))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
