use crate::domain::model::{Person, StepLog};
use crate::domain::ports::{ConnectionSettings, SmokeSuite};
use crate::utils::error::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{
    DeleteOneModel, InsertOneModel, ReturnDocument, UpdateModifications, UpdateOneModel,
    WriteModel,
};
use mongodb::{Client, Collection, IndexModel};

/// Collection used by the `$lookup` stage.
const RELATED_COLLECTION: &str = "related_people";

/// Walks the document-database client surface: CRUD, query and update
/// operators, aggregation, indexing, bulk writes, and the findAndModify
/// family.
pub struct MongoSuite {
    uri: String,
    database: String,
    collection: String,
}

impl MongoSuite {
    pub fn new(settings: &impl ConnectionSettings) -> Self {
        Self {
            uri: settings.document_uri().to_string(),
            database: settings.document_database().to_string(),
            collection: settings.document_collection().to_string(),
        }
    }

    async fn crud(&self, people: &Collection<Person>, log: &mut StepLog) -> Result<()> {
        let inserted = people.insert_one(Person::new("Alice", 25)).await?;
        log.record("insert_one", format!("inserted _id={}", inserted.inserted_id));

        let many = people
            .insert_many(vec![Person::new("Bob", 30), Person::new("Charlie", 35)])
            .await?;
        log.record("insert_many", format!("inserted {} documents", many.inserted_ids.len()));

        let alice = people.find_one(doc! { "name": "Alice" }).await?;
        match alice {
            Some(person) => log.record("find_one", format!("name={} age={}", person.name, person.age)),
            None => log.record("find_one", "none"),
        }

        let all: Vec<Person> = people.find(doc! {}).await?.try_collect().await?;
        log.record("find_many", format!("{} documents", all.len()));

        let count = people.count_documents(doc! { "age": { "$gte": 25 } }).await?;
        log.record("count", format!("age>=25 count={}", count));

        let updated = people
            .update_one(doc! { "name": "Alice" }, doc! { "$set": { "age": 26 } })
            .await?;
        log.record("update_one", format!("modified={}", updated.modified_count));

        let updated_many = people
            .update_many(doc! { "age": { "$gt": 25 } }, doc! { "$set": { "age": 27 } })
            .await?;
        log.record("update_many", format!("modified={}", updated_many.modified_count));

        let replaced = people
            .replace_one(doc! { "name": "Bob" }, Person::new("Bob", 31))
            .await?;
        log.record("replace_one", format!("modified={}", replaced.modified_count));

        let deleted = people.delete_one(doc! { "name": "Charlie" }).await?;
        log.record("delete_one", format!("deleted={}", deleted.deleted_count));

        let deleted_many = people.delete_many(doc! { "age": 27 }).await?;
        log.record("delete_many", format!("deleted={}", deleted_many.deleted_count));

        Ok(())
    }

    async fn operators(&self, people: &Collection<Person>, log: &mut StepLog) -> Result<()> {
        let matches: Vec<Person> = people.find(operator_filter()).await?.try_collect().await?;
        log.record("operator_query", format!("{} matches", matches.len()));

        // The server rejects conflicting paths inside one update document,
        // so each operator family is issued as its own update.
        let filter = doc! { "name": "Alice" };
        let mut modified = 0;
        for update in [
            set_unset_update(),
            increment_update(),
            rename_age_update(),
            restore_age_update(),
        ] {
            modified += people.update_one(filter.clone(), update).await?.modified_count;
        }
        log.record("update_operators", format!("4 updates, modified={}", modified));

        let mut array_modified = 0;
        for update in [
            push_reaction(),
            pull_reaction(),
            add_reaction_to_set(),
            pop_last_reaction(),
        ] {
            array_modified += people.update_one(filter.clone(), update).await?.modified_count;
        }
        log.record("array_operators", format!("4 updates, modified={}", array_modified));

        Ok(())
    }

    async fn aggregation(&self, people: &Collection<Person>, log: &mut StepLog) -> Result<()> {
        let buckets: Vec<Document> = people
            .aggregate(age_histogram_pipeline())
            .await?
            .try_collect()
            .await?;
        log.record("aggregate_group", format!("{} buckets", buckets.len()));

        let reactions: Vec<Document> = people
            .aggregate(reaction_expansion_pipeline(RELATED_COLLECTION))
            .await?
            .try_collect()
            .await?;
        log.record("aggregate_lookup", format!("{} unwound reactions", reactions.len()));

        Ok(())
    }

    async fn indexing(&self, people: &Collection<Person>, log: &mut StepLog) -> Result<()> {
        let single = people
            .create_index(IndexModel::builder().keys(doc! { "name": 1 }).build())
            .await?;

        let many = people
            .create_indexes(vec![
                IndexModel::builder().keys(doc! { "age": 1 }).build(),
                IndexModel::builder().keys(doc! { "name": 1, "age": 1 }).build(),
            ])
            .await?;

        let listed: Vec<IndexModel> = people.list_indexes().await?.try_collect().await?;

        people.drop_index(single.index_name.clone()).await?;
        people.drop_indexes().await?;

        log.record(
            "indexing",
            format!(
                "created 1+{}, listed {}, dropped all",
                many.index_names.len(),
                listed.len()
            ),
        );
        Ok(())
    }

    async fn miscellaneous(
        &self,
        client: &Client,
        people: &Collection<Person>,
        log: &mut StepLog,
    ) -> Result<()> {
        let namespace = people.namespace();
        let models = vec![
            WriteModel::InsertOne(
                InsertOneModel::builder()
                    .namespace(namespace.clone())
                    .document(doc! { "name": "Eve", "age": 22 })
                    .build(),
            ),
            WriteModel::UpdateOne(
                UpdateOneModel::builder()
                    .namespace(namespace.clone())
                    .filter(doc! { "name": "Alice" })
                    .update(UpdateModifications::Document(doc! { "$set": { "age": 29 } }))
                    .build(),
            ),
            WriteModel::DeleteOne(
                DeleteOneModel::builder()
                    .namespace(namespace)
                    .filter(doc! { "name": "Bob" })
                    .build(),
            ),
        ];
        let bulk = client.bulk_write(models).await?;
        log.record(
            "bulk_write",
            format!(
                "inserted={} modified={} deleted={}",
                bulk.inserted_count, bulk.modified_count, bulk.deleted_count
            ),
        );

        let names = people.distinct("name", doc! {}).await?;
        log.record("distinct", format!("{} distinct names", names.len()));

        let updated = people
            .find_one_and_update(doc! { "name": "Eve" }, doc! { "$set": { "age": 23 } })
            .return_document(ReturnDocument::After)
            .await?;
        log.record(
            "find_one_and_update",
            updated
                .map(|p| format!("name={} age={}", p.name, p.age))
                .unwrap_or_else(|| "none".to_string()),
        );

        let deleted = people.find_one_and_delete(doc! { "name": "Eve" }).await?;
        log.record(
            "find_one_and_delete",
            deleted
                .map(|p| format!("name={}", p.name))
                .unwrap_or_else(|| "none".to_string()),
        );

        let replaced = people
            .find_one_and_replace(doc! { "name": "Alice" }, Person::new("Alice", 30))
            .await?;
        log.record(
            "find_one_and_replace",
            replaced
                .map(|p| format!("replaced name={} age={}", p.name, p.age))
                .unwrap_or_else(|| "none".to_string()),
        );

        Ok(())
    }
}

#[async_trait]
impl SmokeSuite for MongoSuite {
    fn name(&self) -> &str {
        "document"
    }

    fn operations(&self) -> Vec<&'static str> {
        vec![
            "connect",
            "reset",
            "insert_one",
            "insert_many",
            "find_one",
            "find_many",
            "count",
            "update_one",
            "update_many",
            "replace_one",
            "delete_one",
            "delete_many",
            "operator_query",
            "update_operators",
            "array_operators",
            "aggregate_group",
            "aggregate_lookup",
            "indexing",
            "bulk_write",
            "distinct",
            "find_one_and_update",
            "find_one_and_delete",
            "find_one_and_replace",
        ]
    }

    async fn run(&self, log: &mut StepLog) -> Result<()> {
        tracing::debug!(
            "Document suite targeting {} ({}.{})",
            self.uri,
            self.database,
            self.collection
        );

        let client = Client::with_uri_str(&self.uri).await?;
        let db = client.database(&self.database);
        db.run_command(doc! { "ping": 1 }).await?;
        log.record("connect", "ping ok");

        let people: Collection<Person> = db.collection(&self.collection);

        // Clear leftovers so reruns behave identically
        let cleared = people.delete_many(doc! {}).await?;
        log.record("reset", format!("cleared {} documents", cleared.deleted_count));

        self.crud(&people, log).await?;
        self.operators(&people, log).await?;
        self.aggregation(&people, log).await?;
        self.indexing(&people, log).await?;
        self.miscellaneous(&client, &people, log).await?;

        Ok(())
    }
}

pub fn operator_filter() -> Document {
    doc! {
        "age": { "$gte": 18, "$lte": 30 },
        "name": { "$in": ["Alice", "Bob"] },
        "$or": [ { "age": { "$lt": 25 } }, { "name": "Charlie" } ],
        "$and": [ { "age": { "$gt": 20 } }, { "name": { "$ne": "Dave" } } ],
        "reactions": { "$exists": true },
    }
}

pub fn set_unset_update() -> Document {
    doc! { "$set": { "age": 26 }, "$unset": { "reactions": "" } }
}

pub fn increment_update() -> Document {
    doc! { "$inc": { "age": 1 } }
}

pub fn rename_age_update() -> Document {
    doc! { "$rename": { "age": "years" } }
}

pub fn restore_age_update() -> Document {
    doc! { "$rename": { "years": "age" } }
}

pub fn push_reaction() -> Document {
    doc! { "$push": { "reactions": { "userId": "user3", "emoji": "😃" } } }
}

pub fn pull_reaction() -> Document {
    doc! { "$pull": { "reactions": { "userId": "user2" } } }
}

pub fn add_reaction_to_set() -> Document {
    doc! { "$addToSet": { "reactions": { "userId": "user4", "emoji": "😎" } } }
}

pub fn pop_last_reaction() -> Document {
    doc! { "$pop": { "reactions": 1 } }
}

/// $match → $group → $sort → $skip → $limit → $project.
pub fn age_histogram_pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": { "age": { "$gte": 18 } } },
        doc! { "$group": { "_id": "$age", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$skip": 1 },
        doc! { "$limit": 5 },
        doc! { "$project": { "age": "$_id", "count": 1, "_id": 0 } },
    ]
}

/// $match → $lookup → $addFields → $unwind → $replaceRoot. Unwinding before
/// replaceRoot guarantees `reactions` is a single object at that stage.
pub fn reaction_expansion_pipeline(related: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "reactions": { "$exists": true } } },
        doc! { "$lookup": {
            "from": related,
            "localField": "name",
            "foreignField": "name",
            "as": "related_docs",
        } },
        doc! { "$addFields": { "related_count": { "$size": "$related_docs" } } },
        doc! { "$unwind": "$reactions" },
        doc! { "$replaceRoot": { "newRoot": "$reactions" } },
    ]
}
