//! Static token catalogues per chain.

use std::collections::HashMap;

use crate::registry::TokenMeta;

pub fn base_tokens() -> HashMap<&'static str, TokenMeta> {
    HashMap::from([
        ("aero", TokenMeta::volatile("AERO", "0x73902f619CEB9B31FD8EFecf435CbDf89E369Ba6", 18, "0x940181a94a35A4569E4529A3cdfB74e38fD98631")),
        ("cbbtc", TokenMeta::volatile("cbBTC", "0xF877ACaFA28c19b96727966690b2f44d35aD5976", 8, "0xcbB7C0000aB88B473b1f5aFd9ef808440eed33Bf")),
        ("cbeth", TokenMeta::volatile("cbETH", "0x3bf93770f2d4a794c3d9EBEfBAeBAE2a8f09A5E5", 18, "0x2Ae3f1EC7F1F5012CfEab0185BfC7Aa3CF0DEc22")),
        ("cbxrp", TokenMeta::volatile("cbXRP", "0xb4fb8fed5b3AaA8434f0B19b1b623d977e07e86d", 6, "0xcb585250F852C6C6bf90434AB21A00f02833A4AF")),
        ("dai", TokenMeta::stable("DAI", "0x73b06D8d18De422E269645eaCe15400DE7462417", 18, 1.0, "0x50c5725949A6F0c72E6C4a641F24049A917DB0Cb")),
        ("eurc", TokenMeta::stable("EURC", "0xb682c840B5F4FC58B20769E691A6fa1305A501a2", 6, 1.16, "0x60a3e35cC302BfA44Cb288BC5a4F316fdB1Adb42")),
        ("lbtc", TokenMeta::volatile("LBTC", "0x10fF57877b79e9bd949B3815220eC87B9fc5D2ee", 8, "0xecAc9C5F704e954931349Da37F60E39f515c11c1")),
        ("mamo", TokenMeta::volatile("MAMO", "0x2F90Bb22eB3979f5FfAd31EA6C3F0792ca66dA32", 18, "0x7300B37DfdfAb110d83290A29DfB31B1740219fE")),
        ("morpho", TokenMeta::volatile("MORPHO", "0x6308204872BdB7432dF97b04B42443c714904F3E", 18, "0xBAa5CC21fd487B8Fcc2F632f3F4E8D37262a0842")),
        ("reth", TokenMeta::volatile("rETH", "0xcb1dacd30638ae38f2b94ea64f066045b7d45f44", 18, "0xB6fe221Fe9EeF5aBa221c348bA20A1Bf5e73624c")),
        ("tbtc", TokenMeta::volatile("tBTC", "0x9A858ebfF1bEb0D3495BB0e2897c1528eD84A218", 18, "0x236aa50979d5f3de3bd1eeb40e81137f22ab794b")),
        ("usdbc", TokenMeta::stable("USDbC", "0x703843C3379b52F9FF486c9f5892218d2a065cC8", 6, 1.0, "0xd9aAEc86B65D86f6A7B5B1b0c42FFA531710b6CA")),
        ("usdc", TokenMeta::stable("USDC", "0xEdc817A28E8B93B03976FBd4a3dDBc9f7D176c22", 6, 1.0, "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913")),
        ("usds", TokenMeta::stable("USDS", "0xb6419c6C2e60c4025D6D06eE4F913ce89425a357", 18, 1.0, "0x820C137Fa70C8691F0E44dC420A5E53C168921DC")),
        ("weeth", TokenMeta::volatile("weETH", "0xb8051464C8c92209C92F3a4CD9C73746C4c3CFb3", 18, "0x04c0599Ae5A44757c0AF6F9Ec3B93DA8976c150a")),
        ("well", TokenMeta::volatile("WELL", "0xdC7810B47eAAb250De623F0eE07764afa5F71ED1", 18, "0xA88594D404727625A9437C3f886C7643872296AE")),
        ("weth", TokenMeta::volatile("WETH", "0x628ff693426583D9a7FB391E54366292F509D457", 18, "0x4200000000000000000000000000000000000006")),
        ("wrseth", TokenMeta::volatile("wrsETH", "0xfC41B49d064Ac646015b459C522820DB9472F4B5", 18, "0xEDfa23602D0EC14714057867A78d01e94176BEA0")),
        ("wsteth", TokenMeta::volatile("wstETH", "0x627Fe393Bc6EdDA28e99AE648fD6fF362514304b", 18, "0xc1CBa3fCea344f92D9239c08C0568f6F2F0ee452")),
    ])
}

pub fn optimism_tokens() -> HashMap<&'static str, TokenMeta> {
    HashMap::from([
        ("dai", TokenMeta::stable("DAI", "0x3FE782C2Fe7668C2F1Eb313ACf3022a31feaD6B2", 18, 1.0, "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1")),
        ("usdc", TokenMeta::stable("USDC", "0x8E08617b0d66359D73Aa11E11017834C29155525", 6, 1.0, "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85")),
        ("weth", TokenMeta::volatile("WETH", "0xb4104C02BBf4E9be85AAa41a62974E4e28D59A33", 18, "0x4200000000000000000000000000000000000006")),
        ("cbeth", TokenMeta::volatile("cbETH", "0x95C84F369bd0251ca903052600A3C96838D78bA1", 18, "0xadDb6A0412DE1BA0F936DCaeb8Aaa24578dcF3B2")),
        ("wsteth", TokenMeta::volatile("wstETH", "0xbb3b1aB66eFB43B10923b87460c0106643B83f9d", 18, "0x1F32b1c2345538c0c6f582fCB022739c4A194Ebb")),
        ("reth", TokenMeta::volatile("rETH", "0x4c2E35E3eC4A0C82849637BC04A4609Dbe53d321", 18, "0x9Bcef72be871e61ED4fBbc7630889beE758eb81D")),
        ("weeth", TokenMeta::volatile("weETH", "0xb8051464c8c92209c92f3a4cd9c73746c4c3cfb3", 18, "0x5A7fACB970D094B6C7FF1df0eA68D99E6e73CBFF")),
        ("wrseth", TokenMeta::volatile("wrsETH", "0x181bA797ccF779D8aB339721ED6ee827E758668e", 18, "0x87eEE96D50Fb761AD85B1c982d28A042169d61b1")),
        ("wbtc", TokenMeta::volatile("WBTC", "0x6e6CA598A06E609c913551B729a228B023f06fDB", 8, "0x68f180fcCe6836688e9084f035309E29Bf0A2095")),
        ("usdt", TokenMeta::stable("USDT", "0xa3A53899EE8f9f6E963437C5B3f805FEc538BF84", 6, 1.0, "0x94b008aA00579c1307B0EF2c499aD98a8ce58e58")),
        ("op", TokenMeta::volatile("OP", "0x9fc345a20541Bf8773988515c5950eD69aF01847", 18, "0x4200000000000000000000000000000000000042")),
        ("velo", TokenMeta::volatile("VELO", "0x866b838b97ee43f2c818b3cb5cc77a0dc22003fc", 18, "0x9560e827aF36c94D2Ac33a39bCE1Fe78631088Db")),
        ("usdt0", TokenMeta::stable("USDT0", "0xed37cD7872c6fe4020982d35104bE7919b8f8b33", 6, 1.0, "0x01bFF41798a0BcF287b996046Ca68b395DbC1071")),
    ])
}

pub fn moonbeam_tokens() -> HashMap<&'static str, TokenMeta> {
    HashMap::from([
        ("glmr", TokenMeta::native("GLMR", "0x091608f4e4a15335145be0a279483c0f8e4c7955", 18)),
        ("xcdot", TokenMeta::volatile("xcDOT", "0xd22da948c0ab3a27f5570b604f3adef5f68211c3", 10, "0xFfFFfFff1FcaCBd218EDc0EbA20Fc2308C778080")),
        ("frax", TokenMeta::stable("FRAX", "0x1C55649f73CDA2f72CEf3DD6C5CA3d49EFcF484C", 18, 1.0, "0x322E86852e492a7Ee17f28a78c663da38FB33bfb")),
        ("xcusdc", TokenMeta::stable("xcUSDC", "0x22b1a40e3178fe7c7109efcc247c5bb2b34abe32", 6, 1.0, "0xFFfffffF7D2B0B761Af01Ca8e25242976ac0aD7D")),
        ("xcusdt", TokenMeta::stable("xcUSDT", "0x42a96c0681b74838ec525adbd13c37f66388f289", 6, 1.0, "0xFFFFFFfFea09FB06d082fd1275CD48b191cbCD1d")),
        ("ethwh", TokenMeta::volatile("ETH.wh", "0xb6c94b3a378537300387b57ab1cc0d2083f9aeac", 18, "0xab3f0245B83feB11d15AAffeFD7AD465a59817eD")),
        ("btcwh", TokenMeta::volatile("BTC.wh", "0xaaa20c5a584a9fecdfedd71e46da7858b774a9ce", 8, "0xE57eBd2d67B462E9926e04a8e33f01cD0D64346D")),
        ("usdcwh", TokenMeta::stable("USDC.wh", "0x744b1756e7651c6d57f5311767eafe5e931d615b", 6, 1.0, "0x931715FEE2d06333043d11F658C8CE934aC61D0c")),
    ])
}

pub fn moonriver_tokens() -> HashMap<&'static str, TokenMeta> {
    HashMap::from([
        ("movr", TokenMeta::native("MOVR", "0x6a1A771C7826596652daDC9145fEAaE62b1cd07f", 18)),
        ("xcksm", TokenMeta::volatile("xcKSM", "0xa0d116513bd0b8f3f14e6ea41556c6ec34688e0f", 12, "0xFfFFfFff1FcaCBd218EDc0EbA20Fc2308C778080")),
        ("frax", TokenMeta::stable("FRAX", "0x93Ef8B7c6171BaB1C0A51092B2c9da8dc2ba0e9D", 18, 1.0, "0x1A93B23281CC1CDE4C4741353F3064709A16197d")),
    ])
}
