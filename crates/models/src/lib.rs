pub mod db;
pub mod record;

#[cfg(test)]
mod tests;
