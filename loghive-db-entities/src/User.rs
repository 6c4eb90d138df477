use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: Option<String>,

    /// Producer identifier this viewer submits entries under.
    pub url: Option<String>,

    /// Expected to be '#RRGGBB'
    pub forecolor: Option<String>,

    pub backcolor: Option<String>,

    /// Verified by the database's `authenticate` function, never here.
    pub webpass: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("No relations defined")
    }
}

impl ActiveModelBehavior for ActiveModel {}
