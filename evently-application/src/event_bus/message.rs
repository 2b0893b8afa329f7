use super::IntegrationEvent;
use crate::context::AppContext;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 线上消息
///
/// `payload` 为集成事件的 JSON 对象（具名字段）。解码时忽略未知字段，
/// 缺失的可选字段取默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Uuid,
    pub event_type: String,
    pub occurred_on_utc: DateTime<Utc>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Message {
    pub fn encode<T: IntegrationEvent>(event: &T) -> Result<Self, AppError> {
        Ok(Self {
            message_id: event.id(),
            event_type: T::EVENT_TYPE.to_string(),
            occurred_on_utc: event.occurred_on_utc(),
            payload: serde_json::to_value(event)?,
        })
    }

    pub fn decode<T: IntegrationEvent>(&self) -> Result<T, AppError> {
        if self.event_type != T::EVENT_TYPE {
            return Err(AppError::Decode {
                event_type: self.event_type.clone(),
                reason: format!("expected {}", T::EVENT_TYPE),
            });
        }

        serde_json::from_value(self.payload.clone()).map_err(|e| AppError::Decode {
            event_type: self.event_type.clone(),
            reason: e.to_string(),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, AppError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(bytes).map_err(|e| AppError::Decode {
            event_type: "<unknown>".to_string(),
            reason: e.to_string(),
        })
    }
}

/// 随消息传递的链路信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub correlation_id: Option<Uuid>,
    pub causation_id: Option<Uuid>,
    pub actor: Option<String>,
}

impl MessageMetadata {
    pub fn from_context(ctx: &AppContext) -> Self {
        Self {
            correlation_id: Some(ctx.correlation_id),
            causation_id: ctx.causation_id,
            actor: ctx.actor.clone(),
        }
    }

    /// 为消费该消息构造全新上下文：沿用关联 ID，因果 ID 指向消息本身
    pub fn to_context(&self, message_id: Uuid) -> AppContext {
        AppContext::builder()
            .correlation_id(self.correlation_id.unwrap_or_else(Uuid::now_v7))
            .causation_id(message_id)
            .maybe_actor(self.actor.clone())
            .build()
    }
}
