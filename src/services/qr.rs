use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use qrcode::{render::svg, QrCode};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{error::ApiError, models::token::QrToken};

/// Issues and rotates the per-date verification tokens. Tokens are kept in an
/// append-only arena per date; exactly one per date is live (not superseded)
/// at any instant.
pub struct QrTokenService {
    base_url: String,
    arena: RwLock<HashMap<NaiveDate, Vec<QrToken>>>,
}

impl QrTokenService {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            arena: RwLock::new(HashMap::new()),
        }
    }

    /// The live token for a date, issuing one on the first call. Idempotent:
    /// repeated calls return the same token until it is regenerated.
    pub async fn get_or_issue(
        &self,
        date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> QrToken {
        let mut arena = self.arena.write().await;
        let tokens = arena.entry(date).or_default();
        if let Some(live) = tokens.iter().find(|t| !t.superseded) {
            return live.clone();
        }
        let token = QrToken {
            date,
            token: Uuid::new_v4().to_string(),
            issued_at: now,
            superseded: false,
        };
        tokens.push(token.clone());
        token
    }

    /// Mint a fresh token and mark every prior one superseded, under a single
    /// write guard: there is no instant with two live tokens, and any
    /// in-flight scan of the old link fails verification from here on.
    pub async fn regenerate(
        &self,
        date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> QrToken {
        let mut arena = self.arena.write().await;
        let tokens = arena.entry(date).or_default();
        for t in tokens.iter_mut() {
            t.superseded = true;
        }
        let token = QrToken {
            date,
            token: Uuid::new_v4().to_string(),
            issued_at: now,
            superseded: false,
        };
        tokens.push(token.clone());
        token
    }

    pub async fn live(&self, date: NaiveDate) -> Option<QrToken> {
        self.arena
            .read()
            .await
            .get(&date)?
            .iter()
            .find(|t| !t.superseded)
            .cloned()
    }

    /// Deterministic link encoded into the QR payload.
    pub fn verification_url(&self, date: NaiveDate, token: &str) -> String {
        format!("{}/verify-meal/{}/{}", self.base_url, date, token)
    }

    /// URL under which the rendered QR image is served.
    pub fn qr_image_url(&self, date: NaiveDate) -> String {
        format!("{}/api/admin/qr-image/{}", self.base_url, date)
    }

    /// Render a payload as a scannable SVG.
    pub fn qr_svg(&self, payload: &str) -> Result<String, ApiError> {
        let code = QrCode::new(payload.as_bytes())
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("QR encoding failed: {e}")))?;
        Ok(code
            .render::<svg::Color>()
            .min_dimensions(240, 240)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock;
    use chrono::{FixedOffset, NaiveTime};

    fn at(date: NaiveDate, h: u32) -> DateTime<FixedOffset> {
        clock::civil_instant(
            FixedOffset::east_opt(330 * 60).unwrap(),
            date,
            NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[tokio::test]
    async fn issuing_is_idempotent_per_date() {
        let svc = QrTokenService::new("http://localhost:8080/");
        let first = svc.get_or_issue(date(), at(date(), 7)).await;
        let second = svc.get_or_issue(date(), at(date(), 8)).await;
        assert_eq!(first.token, second.token);
        assert_eq!(first.issued_at, second.issued_at);
    }

    #[tokio::test]
    async fn regeneration_supersedes_every_prior_token() {
        let svc = QrTokenService::new("http://localhost:8080");
        let old = svc.get_or_issue(date(), at(date(), 7)).await;
        let new = svc.regenerate(date(), at(date(), 9)).await;
        assert_ne!(old.token, new.token);

        let live = svc.live(date()).await.unwrap();
        assert_eq!(live.token, new.token);
        assert!(!live.superseded);

        // get_or_issue afterwards sticks with the regenerated token.
        let again = svc.get_or_issue(date(), at(date(), 10)).await;
        assert_eq!(again.token, new.token);
    }

    #[tokio::test]
    async fn no_token_until_first_issue() {
        let svc = QrTokenService::new("http://localhost:8080");
        assert!(svc.live(date()).await.is_none());
    }

    #[test]
    fn verification_url_is_deterministic() {
        let svc = QrTokenService::new("http://cafeteria.example.com/");
        assert_eq!(
            svc.verification_url(date(), "abc"),
            "http://cafeteria.example.com/verify-meal/2024-06-10/abc"
        );
    }

    #[test]
    fn qr_svg_renders_the_payload() {
        let svc = QrTokenService::new("http://localhost:8080");
        let svg = svc
            .qr_svg("http://localhost:8080/verify-meal/2024-06-10/abc")
            .unwrap();
        assert!(svg.contains("<svg"));
    }
}
