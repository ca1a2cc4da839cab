pub mod fix_seeder;
pub mod negotiation;

#[cfg(test)]
pub(crate) mod test_support;
