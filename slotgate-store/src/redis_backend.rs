//! Redis implementation of the backend traits.
//!
//! Each slot maps to the Redis logical database of the same number. A slot's
//! connection is a multiplexed connection, so concurrent requests share one
//! socket without corrupting each other's in-flight commands.

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use slotgate_core::{Command, CommandName, Pipeline, RangeMode, Reply, Slot};

use crate::{Connector, RedisConfig, SlotConnection, StoreError};

/// Opens one multiplexed Redis connection per slot.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    config: RedisConfig,
}

impl RedisConnector {
    #[must_use]
    pub fn new(config: RedisConfig) -> Self {
        Self { config }
    }

    fn connection_info(&self, slot: Slot) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.config.host.clone(), self.config.port),
            redis: RedisConnectionInfo {
                db: i64::from(slot),
                password: self.config.password.clone(),
                ..RedisConnectionInfo::default()
            },
        }
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn connect(&self, slot: Slot) -> Result<Arc<dyn SlotConnection>, StoreError> {
        let connect_error = |e: redis::RedisError| StoreError::Connect { slot, reason: e.to_string() };
        let client = redis::Client::open(self.connection_info(slot)).map_err(connect_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(connect_error)?;
        tracing::debug!(%slot, host = %self.config.host, port = self.config.port, "redis connection opened");
        Ok(Arc::new(RedisSlotConnection { conn }))
    }
}

/// A slot-bound Redis connection.
#[derive(Clone)]
pub struct RedisSlotConnection {
    conn: MultiplexedConnection,
}

#[async_trait]
impl SlotConnection for RedisSlotConnection {
    async fn execute(&self, command: &Command) -> Result<Reply, StoreError> {
        let mut conn = self.conn.clone();
        let value: redis::Value = to_redis_cmd(command).query_async(&mut conn).await?;
        decode_reply(command.name(), &value)
    }

    async fn execute_atomic(&self, pipeline: &Pipeline) -> Result<Vec<Reply>, StoreError> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for command in pipeline.commands() {
            pipe.add_command(to_redis_cmd(command));
        }

        let mut conn = self.conn.clone();
        let values: Vec<redis::Value> = pipe.query_async(&mut conn).await?;
        if values.len() != pipeline.len() {
            return Err(StoreError::UnexpectedReply {
                command: pipeline.commands().first().map_or(CommandName::Sadd, Command::name),
                reason: format!(
                    "transaction returned {} replies for {} commands",
                    values.len(),
                    pipeline.len()
                ),
            });
        }

        pipeline
            .commands()
            .iter()
            .zip(&values)
            .map(|(command, value)| decode_reply(command.name(), value))
            .collect()
    }
}

/// Translate a validated command into its Redis wire form.
fn to_redis_cmd(command: &Command) -> redis::Cmd {
    let mut cmd = redis::cmd(command.name().wire_token());
    match command {
        Command::Sadd { key, members } => {
            cmd.arg(key).arg(members);
        }
        Command::Zrange { key, start, end, mode } => {
            cmd.arg(key).arg(start).arg(end);
            if *mode == RangeMode::Score {
                cmd.arg(RangeMode::SCORE_FLAG);
            }
        }
    }
    cmd
}

fn decode_reply(command: CommandName, value: &redis::Value) -> Result<Reply, StoreError> {
    let unexpected = |e: redis::RedisError| StoreError::UnexpectedReply {
        command,
        reason: e.to_string(),
    };
    match command {
        CommandName::Sadd => redis::from_redis_value::<i64>(value)
            .map(Reply::Integer)
            .map_err(unexpected),
        CommandName::Zrange => redis::from_redis_value::<Vec<String>>(value)
            .map(Reply::Members)
            .map_err(unexpected),
    }
}
