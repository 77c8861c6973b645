pub mod customers;
pub mod orders;
pub mod product_images;
pub mod products;

pub use customers::Entity as Customers;
pub use orders::Entity as Orders;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
