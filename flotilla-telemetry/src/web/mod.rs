pub mod fleet_page;
pub mod server;

#[cfg(test)]
mod tests;
