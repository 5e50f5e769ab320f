use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("design '{0}' references its own product in its bom")]
    SelfReferentialDesign(String),

    #[error("design has an empty name")]
    EmptyDesignName,

    #[error("duplicate design name: {0}")]
    DuplicateDesignName(String),

    #[error("party has an empty name")]
    EmptyPartyName,

    #[error("duplicate party name: {0}")]
    DuplicatePartyName(String),
}

#[derive(Error, Debug)]
pub enum DesignError {
    #[error("design '{name}' has its own product '{product}' in its bom")]
    ProductInBom { name: String, product: String },

    #[error("design '{name}' has atom '{atom}' in both bom and byproducts")]
    BomByproductOverlap { name: String, atom: String },
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
pub type DesignResult<T> = std::result::Result<T, DesignError>;
