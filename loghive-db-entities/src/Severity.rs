use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "severities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: Option<String>,

    /// Expected to be '#RRGGBB'
    pub forecolor: Option<String>,

    pub backcolor: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("No relations defined")
    }
}

impl ActiveModelBehavior for ActiveModel {}
