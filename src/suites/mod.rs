// One module per data store, each walking that store's fixed operation menu.

pub mod elastic;
pub mod mongo;
pub mod postgres;
pub mod redis;

pub use self::elastic::ElasticSuite;
pub use self::mongo::MongoSuite;
pub use self::postgres::PostgresSuite;
pub use self::redis::RedisSuite;
