mod scenarios;
mod strategy;
mod utils;
