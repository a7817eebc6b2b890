use log::error;
use redis::{Client, Commands, Connection, FromRedisValue, RedisResult, ToRedisArgs};
use snafu::ResultExt;

use crate::errors::{CustomResult, Error, RedisSnafu, SerializationSnafu};
use crate::modules::leaderboard::Leaderboard;

pub struct Redis {}

impl Redis {
    pub fn connect(redis_url: &str) -> RedisResult<Connection> {
        Client::open(redis_url)?.get_connection()
    }

    pub fn set_data<K: ToRedisArgs, D: ToRedisArgs>(
        conn: &mut Connection,
        key: K,
        data: D,
    ) -> RedisResult<()> {
        conn.set::<K, D, ()>(key, data)
    }

    pub fn get_data<K: ToRedisArgs, D: FromRedisValue>(
        conn: &mut Connection,
        key: K,
    ) -> RedisResult<D> {
        conn.get::<K, D>(key)
    }

    pub fn invalidate<K: ToRedisArgs>(conn: &mut Connection, key: K) -> RedisResult<()> {
        conn.del::<K, ()>(key)
    }
}

/// computed leaderboards, stored under the path the web layer serves them from
pub struct LeaderboardCache {}

impl LeaderboardCache {
    pub fn key(race_id: i32) -> String {
        format!("/races/leaderboard?raceId={race_id}")
    }

    /// the stored form of a leaderboard
    pub fn encode(leaderboard: &Leaderboard) -> CustomResult<String> {
        serde_json::to_string(leaderboard).context(SerializationSnafu)
    }

    pub fn decode(data: &str) -> CustomResult<Leaderboard> {
        serde_json::from_str(data).context(SerializationSnafu)
    }

    pub fn publish(
        conn: &mut Connection,
        race_id: i32,
        leaderboard: &Leaderboard,
    ) -> CustomResult<()> {
        let data = LeaderboardCache::encode(leaderboard)?;

        Redis::set_data(conn, LeaderboardCache::key(race_id), data).map_err(|source| {
            error!(
                target: "redis:publish",
                "Error publishing leaderboard of race {}: {}",
                race_id,
                source,
            );
            Error::Redis { source }
        })
    }

    /// the last published leaderboard, `None` when nothing was published
    pub fn fetch(conn: &mut Connection, race_id: i32) -> CustomResult<Option<Leaderboard>> {
        let data: Option<String> =
            Redis::get_data(conn, LeaderboardCache::key(race_id)).context(RedisSnafu)?;

        data.as_deref().map(LeaderboardCache::decode).transpose()
    }

    /// drop a published leaderboard, so it is not served once its race data changed
    pub fn clear(conn: &mut Connection, race_id: i32) -> CustomResult<()> {
        Redis::invalidate(conn, LeaderboardCache::key(race_id)).context(RedisSnafu)
    }
}
