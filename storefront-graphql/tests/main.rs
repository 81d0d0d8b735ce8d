mod config_store;
