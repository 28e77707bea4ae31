mod category_dto;

pub use category_dto::{
    CreateCategoryDto, CreateSubcategoryDto, ReorderRequestDto, UpdateCategoryDto,
    UpdateSubcategoryDto,
};
