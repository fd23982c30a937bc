mod concurrency;
mod history_queries;
