pub use sea_orm_migration::prelude::*;

mod m20250815_add_indexes;
mod m20250815_create_all_tables;
mod m20250816_add_active_pair_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250815_create_all_tables::Migration),
            Box::new(m20250815_add_indexes::Migration),
            Box::new(m20250816_add_active_pair_indexes::Migration),
        ]
    }
}
