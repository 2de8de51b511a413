mod demo;
mod series;
mod source;
mod storage;

pub use {
    demo::generate_demo_series,
    series::{CandleSeries, close_change_pct},
    source::{DemoSource, JsonFileSource, MarketDataSource, OhlcvPage, page_of, resample},
    storage::{
        DataKind, EframeStore, KeyValueStore, MemoryStore, PersistGate, erase, load_json,
        save_json,
    },
};
